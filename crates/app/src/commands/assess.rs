//! The `assess` command: an interactive run on stdin/stdout.

use std::io::{self, BufRead, Write};

use anyhow::{Result, bail};
use services::{AppServices, AssessmentService, AssessmentSummary};
use trainer_core::model::{CheckOutcome, Step};

pub async fn execute(services: &AppServices) -> Result<()> {
    let Some(user) = services.users().current_user().await? else {
        bail!("log in before taking the assessment");
    };
    tracing::info!(user = %user.id(), "starting assessment");

    let mut assessment = services.start_assessment()?;
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout().lock();
    loop {
        let summary = run_to_completion(&mut assessment, &mut input, &mut output)?;
        print_summary(&summary, &mut output)?;
        if !confirm("Retake the assessment? [y/N] ", &mut input, &mut output)? {
            return Ok(());
        }
        assessment.restart()?;
    }
}

/// Drive the run until it is complete, reading one answer per line.
///
/// Answers are 1-based option numbers. Blank or invalid lines re-prompt.
pub fn run_to_completion<R: BufRead, W: Write>(
    assessment: &mut AssessmentService,
    input: &mut R,
    output: &mut W,
) -> Result<AssessmentSummary> {
    while !assessment.run().is_complete() {
        let progress = assessment.progress();
        let question = assessment.current_question()?;
        writeln!(
            output,
            "\nQuestion {} of {} ({}%)  |  Score: {}%",
            progress.question_number,
            progress.total,
            progress.progress_percent,
            progress.running_percent
        )?;
        writeln!(output, "[{}] {}", question.category(), question.prompt())?;
        for (index, option) in question.options().iter().enumerate() {
            writeln!(output, "  {}. {option}", index + 1)?;
        }
        let options = question.option_count();

        write!(output, "Your answer (1-{options}): ")?;
        output.flush()?;
        let Some(line) = read_line(input)? else {
            bail!("input ended before the assessment was finished");
        };
        if let Ok(choice) = line.trim().parse::<usize>() {
            if let Err(err) = choice
                .checked_sub(1)
                .map_or(Ok(()), |option| assessment.select_option(option))
            {
                writeln!(output, "{err}")?;
                continue;
            }
        }

        match assessment.advance() {
            Ok(Step::Checked(outcome)) => print_feedback(assessment, &outcome, output)?,
            Ok(_) => {}
            Err(err) if err.is_recoverable() => {
                writeln!(output, "{err}")?;
                continue;
            }
            Err(err) => return Err(err.into()),
        }

        let label = assessment.progress().primary_action.label();
        write!(output, "Press Enter for {label} ")?;
        output.flush()?;
        if read_line(input)?.is_none() {
            bail!("input ended before the assessment was finished");
        }
        assessment.advance()?;
    }

    match assessment.summary() {
        Some(summary) => Ok(summary),
        None => bail!("assessment ended without a summary"),
    }
}

fn print_feedback<W: Write>(
    assessment: &AssessmentService,
    outcome: &CheckOutcome,
    output: &mut W,
) -> Result<()> {
    if outcome.is_correct {
        writeln!(output, "Correct!")?;
    } else {
        let question = assessment.current_question()?;
        let answer = question
            .options()
            .get(outcome.correct_option)
            .map_or("", String::as_str);
        writeln!(
            output,
            "Incorrect. The correct answer is {}. {answer}",
            outcome.correct_option + 1
        )?;
    }
    if !outcome.explanation.is_empty() {
        writeln!(output, "{}", outcome.explanation)?;
    }
    if !outcome.guidance.is_empty() {
        writeln!(output, "Guidance: {}", outcome.guidance)?;
    }
    Ok(())
}

fn print_summary<W: Write>(summary: &AssessmentSummary, output: &mut W) -> Result<()> {
    writeln!(output, "\nAssessment complete")?;
    writeln!(
        output,
        "You scored {} out of {} ({}%).",
        summary.score, summary.total, summary.percentage
    )?;
    writeln!(output, "{}", summary.band.message())?;

    if summary.recommendations.is_empty() {
        return Ok(());
    }
    writeln!(output, "\nAreas to review:")?;
    for rec in &summary.recommendations {
        let noun = if rec.count == 1 { "mistake" } else { "mistakes" };
        writeln!(output, "- {} ({} {noun})", rec.category, rec.count)?;
        for line in &rec.recommendations {
            writeln!(output, "    * {line}")?;
        }
    }
    Ok(())
}

fn confirm<R: BufRead, W: Write>(prompt: &str, input: &mut R, output: &mut W) -> Result<bool> {
    write!(output, "{prompt}")?;
    output.flush()?;
    Ok(read_line(input)?.is_some_and(|line| line.trim().eq_ignore_ascii_case("y")))
}

fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}
