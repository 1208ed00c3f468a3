fn load_dotenv() {
    // Missing .env is fine; the environment may be set by the shell.
    let _ = dotenvy::dotenv();
}

fn main() {
    load_dotenv();
    tracing_subscriber::fmt::init();
    dioxus::launch(starling::ui::App);
}
