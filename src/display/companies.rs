//! Company directory formatting

/// Format company names as an indented list
pub fn format_company_list(names: &[String]) -> String {
    if names.is_empty() {
        return "No companies found.".to_string();
    }

    let mut output = String::new();
    for name in names {
        output.push_str(&format!("  {}\n", name));
    }
    output.push_str(&format!("\n{} companies\n", names.len()));
    output
}
