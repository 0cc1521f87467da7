use std::path::Path;

use colored::*;
use rulecraft_rules::{EvaluationTrace, RuleNode, TraceNode};

pub fn print_valid(path: &Path, rule: &RuleNode) {
    println!("{} {}", "✔ valid rule:".green().bold(), path.display());
    println!("  Nodes: {}", rule.node_count());
    println!("  Depth: {}", rule.depth());
}

pub fn print_result(label: &str, matched: bool) {
    if matched {
        println!("{} {}", "✔ match".green().bold(), label);
    } else {
        println!("{} {}", "✘ no match".red().bold(), label);
    }
}

pub fn print_summary(matched: usize, total: usize) {
    println!("{}", format!("{matched}/{total} documents matched").bold());
}

pub fn print_trace(trace: &EvaluationTrace) {
    print_trace_at(trace, 1);
}

fn print_trace_at(trace: &EvaluationTrace, indent: usize) {
    let pad = "  ".repeat(indent);
    let mark = if trace.matched { "✔".green() } else { "✘".red() };
    match &trace.node {
        TraceNode::Condition {
            field,
            operator,
            resolved,
        } => {
            let resolved = resolved
                .as_ref()
                .map(|value| value.to_string())
                .unwrap_or_else(|| "<absent>".dimmed().to_string());
            println!("{pad}{mark} {field} {operator} (found {resolved})");
        }
        TraceNode::Group {
            kind,
            children,
            skipped,
        } => {
            println!("{pad}{mark} {}", kind.key().bold());
            for child in children {
                print_trace_at(child, indent + 1);
            }
            if *skipped > 0 {
                println!("{pad}  {}", format!("… {skipped} skipped").dimmed());
            }
        }
    }
}
