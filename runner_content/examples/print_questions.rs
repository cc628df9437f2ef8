use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
struct Args {
    path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let questions = runner_content::load_questions_json_from_path(args.path)?;
    println!("questions={}", questions.len());
    for q in &questions {
        let correct = q.correct_answer().map(|a| a.label.as_str()).unwrap_or("-");
        println!("{}\tanswers={}\tcorrect={}", q.id, q.answers.len(), correct);
    }
    Ok(())
}
