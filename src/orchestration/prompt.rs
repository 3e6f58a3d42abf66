//! Operator prompts

use crate::core::traits::Prompter;
use async_trait::async_trait;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader, Stdin};
use tokio::sync::Mutex;

/// Asks on stdout and reads one answer line per question from `input`
///
/// The reader lives as long as the prompter, so answers piped in ahead of
/// time are consumed one question at a time.
#[derive(Debug)]
pub struct LinePrompter<R> {
    input: Mutex<R>,
}

/// Prompter reading answers from stdin
pub type StdinPrompter = LinePrompter<BufReader<Stdin>>;

impl StdinPrompter {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(io::stdin()))
    }
}

impl<R> LinePrompter<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn new(input: R) -> Self {
        Self {
            input: Mutex::new(input),
        }
    }
}

#[async_trait]
impl<R> Prompter for LinePrompter<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn confirm(&self, message: &str) -> std::io::Result<bool> {
        let mut stdout = io::stdout();
        stdout
            .write_all(format!("{} (yes/no): ", message).as_bytes())
            .await?;
        stdout.flush().await?;

        let mut answer = String::new();
        self.input.lock().await.read_line(&mut answer).await?;

        Ok(is_affirmative(&answer))
    }
}

/// "y" and "yes" in any case count as yes
pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim().to_lowercase();
    answer == "yes" || answer == "y"
}

/// Prompter that replays canned answers and records the questions
#[cfg(test)]
pub struct ScriptedPrompter {
    answers: std::sync::Mutex<std::collections::VecDeque<bool>>,
    questions: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl ScriptedPrompter {
    pub fn new(answers: &[bool]) -> Self {
        Self {
            answers: std::sync::Mutex::new(answers.iter().copied().collect()),
            questions: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl Prompter for ScriptedPrompter {
    async fn confirm(&self, message: &str) -> std::io::Result<bool> {
        self.questions.lock().unwrap().push(message.to_string());
        Ok(self.answers.lock().unwrap().pop_front().unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_affirmative() {
        assert!(is_affirmative("yes\n"));
        assert!(is_affirmative("Y"));
        assert!(is_affirmative("  YES  "));
        assert!(!is_affirmative("no"));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("yep"));
    }

    #[tokio::test]
    async fn test_line_prompter_reads_one_line_per_question() {
        let input: &[u8] = b"yes\nyes\nno\n";
        let prompter = LinePrompter::new(input);

        assert!(prompter.confirm("Continue despite missing artifacts?").await.unwrap());
        assert!(prompter.confirm("Continue despite failed commands?").await.unwrap());
        assert!(!prompter.confirm("third?").await.unwrap());
    }

    #[tokio::test]
    async fn test_line_prompter_eof_is_no() {
        let input: &[u8] = b"y\n";
        let prompter = LinePrompter::new(input);

        assert!(prompter.confirm("first?").await.unwrap());
        assert!(!prompter.confirm("second?").await.unwrap());
    }

    #[tokio::test]
    async fn test_scripted_prompter_replays_answers() {
        let prompter = ScriptedPrompter::new(&[true]);

        assert!(prompter.confirm("first?").await.unwrap());
        assert!(!prompter.confirm("second?").await.unwrap());
        assert_eq!(prompter.questions(), vec!["first?", "second?"]);
    }
}
