// src/utils/log.rs

//! Banner and summary formatting on top of the `log` facade.

const RULE_WIDTH: usize = 60;

/// Log a header
pub fn header(title: &str) {
    let border = "═".repeat(RULE_WIDTH);
    ::log::info!("{border}");
    ::log::info!("  {title}");
    ::log::info!("{border}");
}

/// Log a step in a process
pub fn step(step_num: usize, total: usize, message: &str) {
    ::log::info!("{}", step_line(step_num, total, message));
}

/// Log a summary section
pub fn summary(title: &str, items: &[(&str, String)]) {
    for line in summary_lines(title, items) {
        ::log::info!("{line}");
    }
}

fn step_line(step_num: usize, total: usize, message: &str) -> String {
    format!("[STEP {step_num}/{total}] {message}")
}

fn summary_lines(title: &str, items: &[(&str, String)]) -> Vec<String> {
    std::iter::once(format!("[SUMMARY] {title}"))
        .chain(items.iter().map(|(key, value)| format!("    {key}: {value}")))
        .collect()
}
