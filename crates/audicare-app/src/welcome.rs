//! Welcome screen.

use audicare_core::APP_NAME;

/// Bottom navigation labels, left to right.
pub const NAV_ITEMS: [&str; 4] = ["Home", "Checkup", "Records", "Profile"];

/// Render the welcome screen as plain text.
pub fn render() -> String {
    let mut out = String::new();
    out.push_str("  (+)  ");
    out.push_str(APP_NAME);
    out.push_str("\n\n");
    out.push_str(&format!("  Welcome to {}\n", APP_NAME));
    out.push_str("  Your Smart Health Companion\n\n");
    out.push_str("  [ Start Symptom Check ]   run `audicare talk`\n\n");
    out.push_str(&format!("  {}\n", "-".repeat(40)));
    out.push_str(&format!("  {}\n", NAV_ITEMS.join("  |  ")));
    out
}
