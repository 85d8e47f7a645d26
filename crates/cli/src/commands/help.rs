//! Usage text, generated from the command registry

use clip_core::Collection;

const OPTIONS: &[(&str, &str)] = &[
    ("--limit N, --page N", "Paging for list commands"),
    ("--fields a,b", "Fields to return"),
    ("--order-by F, --order-dir ASC|DESC", "Sort order"),
    ("--type note|folder|tag", "Item type for search"),
    ("--cursor C", "Event cursor"),
    ("--title, --body, --body-html", "Note and folder fields"),
    ("--parent-id, --source-url, --author", "Note fields"),
    ("--is-todo, --todo-due, --todo-completed", "To-do fields"),
    ("--output PATH", "Destination for resources download"),
    ("--tab ID, --no-activate, --all", "Browser options"),
];

/// Full usage text
pub fn usage() -> String {
    let mut text = String::from(
        "clip - client for a local notes clipper API and Chrome DevTools\n\n\
         Usage: clip [--host H] [--port P] [--token T] [--debug] [--quiet] [--no-progress]\n\
         \x20           <command> [<subcommand>] [<args>...] [--<option> [<value>]]...\n\n\
         Commands:\n",
    );

    for collection in Collection::ALL {
        text.push_str(&format!("  {:<11}{}\n", collection.name(), collection.description()));
        let operations = collection.operations();
        if !operations.is_empty() {
            let names: Vec<&str> = operations.iter().map(|op| op.name()).collect();
            text.push_str(&format!("  {:<11}  {}\n", "", names.join(" | ")));
        }
    }

    text.push_str("\nOptions:\n");
    for (flags, description) in OPTIONS {
        text.push_str(&format!("  {flags:<42}{description}\n"));
    }

    text.push_str(
        "\nThe token is read from --token or CLIP_TOKEN. Results are printed as JSON on\n\
         stdout; errors as {\"error\": ...} on stderr.",
    );
    text
}
