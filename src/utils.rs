use anyhow::Result;

use anyhow::anyhow;
use dialoguer::Confirm;
use dialoguer::theme::ColorfulTheme;
use directories::ProjectDirs;

pub fn trim_line(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

pub fn ask_yn(prompt: String) -> bool {
    println!("{}", prompt);
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Proceed? ")
        .report(true)
        .wait_for_newline(true)
        .interact()
        .unwrap()
}

pub fn get_data_dir() -> Result<std::path::PathBuf> {
    let proj_dirs = ProjectDirs::from("", "", "blumen")
        .ok_or_else(|| anyhow!("Could not determine project directory"))?;

    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)?;

    Ok(data_dir.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_line() {
        assert_eq!(trim_line("  rose  "), Some("rose"));
        assert_eq!(trim_line("   "), None);
    }

    #[test]
    fn test_pluralize_single() {
        assert_eq!(pluralize("flower", 1), "1 flower");
    }

    #[test]
    fn test_pluralize_multiple() {
        assert_eq!(pluralize("flower", 2), "2 flowers");
        assert_eq!(pluralize("attempt", 5), "5 attempts");
    }

    #[test]
    fn test_pluralize_zero() {
        assert_eq!(pluralize("flower", 0), "0 flowers");
    }
}
