use {
    anyhow::{Context, Result, bail},
    assess::{AssessError, GenerationService, Intake, IntakeStep},
    std::time::Duration,
    tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin, stdin, stdout},
};

// attempts per answer before giving up on the generation service
const MAX_ATTEMPTS: usize = 3;
const RETRY_DELAY: Duration = Duration::from_secs(2);

async fn prompt(lines: &mut Lines<BufReader<Stdin>>, question: &str) -> Result<String> {
    let mut out = stdout();
    out.write_all(format!("\n{}\n> ", question).as_bytes()).await?;
    out.flush().await?;
    loop {
        let line = lines.next_line().await?.context("input closed")?;
        let answer = line.trim();
        if !answer.is_empty() {
            return Ok(answer.to_string());
        }
        out.write_all(b"> ").await?;
        out.flush().await?;
    }
}

/// Ask the intake questions on the terminal until the service is ready.
pub async fn run_intake(service: &dyn GenerationService) -> Result<Intake> {
    let mut intake = Intake::new();
    let mut lines = BufReader::new(stdin()).lines();
    loop {
        let answer = prompt(&mut lines, intake.current_question()).await?;
        let mut attempt = 0;
        let step = loop {
            attempt += 1;
            match intake.answer(service, &answer).await {
                Ok(step) => break step,
                Err(AssessError::Service(error)) if attempt < MAX_ATTEMPTS => {
                    log::warn!("intake: attempt {} failed: {}", attempt, error);
                    tokio::time::sleep(RETRY_DELAY).await;
                }
                Err(error) => bail!("intake failed: {}", error),
            }
        };
        if let IntakeStep::Ready(result) = step {
            println!("\nThank you. Next: {}", result.motion.description);
            return Ok(intake);
        }
    }
}
