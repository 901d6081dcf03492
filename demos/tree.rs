//! Build a small tree in a memory store and print it.
//!
//! Run with `RUST_LOG=debug` to see the store calls issued per path segment.

use std::sync::Arc;

use sandfs::{InitOptions, ListedEntry, MemoryStore, MoveOptions, Session};

fn print_tree(items: &[ListedEntry], depth: usize) {
    for item in items {
        let marker = if item.entry.is_directory() { "/" } else { "" };
        println!("{}{}{}", "  ".repeat(depth), item.name(), marker);
        if let Some(children) = &item.children {
            print_tree(children, depth + 1);
        }
    }
}

#[tokio::main]
async fn main() -> sandfs::Result<()> {
    env_logger::init();

    let store = MemoryStore::new().with_page_size(4);
    let mut session = Session::new(Arc::new(store));
    session.init(InitOptions::persistent(1024 * 1024)).await?;

    session.write_file("docs/readme.txt", "hello\n").await?;
    session.write_file("docs/notes/todo.txt", "- write more docs\n").await?;
    session.append_file("docs/notes/todo.txt", "- ship it\n").await?;
    session.mkdir("cache/thumbnails").await?;
    session
        .copy("docs", "backup/docs", MoveOptions { create: true })
        .await?;
    session
        .rename("docs/readme.txt", "README", MoveOptions::default())
        .await?;

    print_tree(&session.readdir("/", true).await?, 0);

    let stat = session.stat("docs/notes/todo.txt").await?;
    match serde_json::to_string_pretty(&stat) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("failed to render stat: {}", e),
    }
    println!("url: {}", session.get_url("README").await?);

    let usage = session.usage().await?;
    println!(
        "used {} of {} bytes ({} free)",
        usage.used_bytes,
        usage.granted_bytes,
        usage.free()
    );

    if let Err(e) = session.read_file("docs/readme.txt").await {
        println!("expected failure: {}", e);
    }
    Ok(())
}
