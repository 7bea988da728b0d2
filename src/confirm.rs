use crate::error::Result;
use async_trait::async_trait;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Yes/no question put to the user before a destructive action
#[async_trait]
pub trait Confirm: Send + Sync {
    /// `Ok(false)` covers both "no" and a dismissed prompt
    async fn confirm(&self, question: &str) -> Result<bool>;
}

/// Fixed answer, used for `--yes` and in tests
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

#[async_trait]
impl Confirm for AutoConfirm {
    async fn confirm(&self, _question: &str) -> Result<bool> {
        Ok(self.0)
    }
}

/// Prompts on stdout and reads one line from stdin. Anything other than
/// `y`/`yes` (including EOF) is a no.
#[derive(Debug, Default)]
pub struct StdinConfirm;

#[async_trait]
impl Confirm for StdinConfirm {
    async fn confirm(&self, question: &str) -> Result<bool> {
        {
            let mut stdout = std::io::stdout().lock();
            write!(stdout, "{} [y/N] ", question)?;
            stdout.flush()?;
        }

        let mut line = String::new();
        let read = BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
        if read == 0 {
            return Ok(false);
        }

        Ok(parse_answer(&line))
    }
}

fn parse_answer(line: &str) -> bool {
    matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_answer() {
        assert!(parse_answer("y\n"));
        assert!(parse_answer("  YES "));
        assert!(!parse_answer("n"));
        assert!(!parse_answer(""));
        assert!(!parse_answer("yep"));
    }

    #[tokio::test]
    async fn test_auto_confirm() {
        assert!(AutoConfirm(true).confirm("Remove?").await.unwrap());
        assert!(!AutoConfirm(false).confirm("Remove?").await.unwrap());
    }
}
