//! Explain command - explain diagnostic codes

use anyhow::{anyhow, Result};
use clap::Args;

use crate::{Output, OutputFormat};

#[derive(Args, Debug)]
pub struct ExplainArgs {
    /// Diagnostic code to explain (e.g., N001, P001)
    pub code: String,
}

struct ErrorExplanation {
    code: &'static str,
    title: &'static str,
    description: &'static str,
    example: Option<&'static str>,
    suggestion: Option<&'static str>,
    related: &'static [&'static str],
}

const ERROR_EXPLANATIONS: &[ErrorExplanation] = &[
    ErrorExplanation {
        code: "P001",
        title: "Parse Error",
        description: "The input could not be parsed as JavaScript or TypeScript. Nothing is written for a file that fails to parse.",
        example: Some("obj.x = ;  // missing value"),
        suggestion: Some("Fix the syntax error; the file is rewritten on the next run."),
        related: &[],
    },
    ErrorExplanation {
        code: "N001",
        title: "Optional Chain Left Native",
        description: "Optional chains (`a?.b`, `a?.[k]`, `f?.()`) are not rewritten. Lowering them would change where evaluation short-circuits, so they stay as written and a virtual object's handlers are not consulted for that access.",
        example: Some("const name = user?.profile;  // get handler of `user` is skipped"),
        suggestion: Some("Test for null explicitly and use a plain member access:\nconst name = user == null ? undefined : user.profile;"),
        related: &["N002"],
    },
    ErrorExplanation {
        code: "N002",
        title: "Pattern Target Left Native",
        description: "A member expression used as a destructuring target or as the head of a for-in/for-of loop is assigned by the engine itself, so a virtual object's set handler is not called.",
        example: Some("[obj.a, obj.b] = pair;\nfor (obj.key in table) {}"),
        suggestion: Some("Destructure into locals and assign each property separately:\nconst [a, b] = pair; obj.a = a; obj.b = b;"),
        related: &["N001"],
    },
    ErrorExplanation {
        code: "I001",
        title: "Internal Error",
        description: "The rewriter failed after parsing, for example while preparing the dispatch runtime with custom entry point names or while printing the result.",
        example: None,
        suggestion: Some("Check the [dispatch] table in proxyshim.toml, then rerun with -vv and report the input that triggers it."),
        related: &["P001"],
    },
];

pub fn run(args: ExplainArgs, output: Output) -> Result<()> {
    let code = args.code.to_uppercase();
    let use_color = output.use_color;

    let explanation = ERROR_EXPLANATIONS
        .iter()
        .find(|e| e.code == code)
        .ok_or_else(|| anyhow!("Unknown diagnostic code: {}", code))?;

    match output.format {
        OutputFormat::Text => {
            if use_color {
                println!(
                    "\n{}: {}\n{}",
                    console::style(&code).bold().cyan(),
                    console::style(explanation.title).bold(),
                    "=".repeat(code.len() + explanation.title.len() + 2)
                );
            } else {
                println!(
                    "\n{}: {}\n{}",
                    code,
                    explanation.title,
                    "=".repeat(code.len() + explanation.title.len() + 2)
                );
            }

            println!("\n{}\n", explanation.description);

            if let Some(example) = explanation.example {
                if use_color {
                    println!("{}:", console::style("Example").bold());
                } else {
                    println!("Example:");
                }
                for line in example.lines() {
                    println!("  {}", line);
                }
                println!();
            }

            if let Some(suggestion) = explanation.suggestion {
                if use_color {
                    println!("{}:", console::style("Suggestion").bold().green());
                } else {
                    println!("Suggestion:");
                }
                for line in suggestion.lines() {
                    println!("  {}", line);
                }
                println!();
            }

            if !explanation.related.is_empty() {
                if use_color {
                    println!(
                        "{}: {}",
                        console::style("Related").dim(),
                        explanation.related.join(", ")
                    );
                } else {
                    println!("Related: {}", explanation.related.join(", "));
                }
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "code": explanation.code,
                "title": explanation.title,
                "description": explanation.description,
                "example": explanation.example,
                "suggestion": explanation.suggestion,
                "related": explanation.related,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
