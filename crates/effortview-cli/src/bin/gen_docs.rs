//! Binary that emits command-line options markdown to stdout.

fn main() {
    print!("{}", effortview_cli::render_options_markdown());
}
