use serde_json::json;

use crate::ctx::Ctx;

const RESET: &str = "\x1b[0m";
const FG_ORANGE: &str = "\x1b[38;5;214m";

pub fn warning_text(color: bool, message: &str) -> String {
    if color {
        format!("{FG_ORANGE}{message}{RESET}")
    } else {
        message.to_string()
    }
}

/// Reports a lookup that found nothing. Not an error for the process.
pub fn show_diagnostic(ctx: &Ctx, message: &str) {
    if ctx.is_json() {
        println!("{}", json!({ "error": message }));
    } else {
        println!("{message}");
    }
}
