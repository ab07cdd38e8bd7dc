//! Plain-text rendering of process listings.

use crate::models::{Process, ProcessPriority};

const HIGH: char = '▲';
const MEDIUM: char = '■';
const LOW: char = '▽';

fn priority_symbol(priority: ProcessPriority) -> char {
    match priority {
        ProcessPriority::High => HIGH,
        ProcessPriority::Medium => MEDIUM,
        ProcessPriority::Low => LOW,
    }
}

/// Render a numbered process listing.
///
/// Example output:
/// ```text
/// Process list:
///     0. ▲ 0190a5c4-... [high] build
///     1. ▽ 0190a5c4-... [low] test
/// ```
pub fn render_process_list(processes: &[Process]) -> String {
    let mut output = String::from("Process list:\n");
    if processes.is_empty() {
        output.push_str("    (empty)\n");
        return output;
    }
    for (i, process) in processes.iter().enumerate() {
        output.push_str(&format!(
            "    {}. {} {} [{}] {}\n",
            i,
            priority_symbol(process.priority()),
            process.id(),
            process.priority(),
            process.command()
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IdGenerator, SequentialIds};

    #[test]
    fn test_empty_list() {
        assert_eq!(render_process_list(&[]), "Process list:\n    (empty)\n");
    }

    #[test]
    fn test_numbered_entries() {
        let ids = SequentialIds::new(0);
        let processes = vec![
            Process::detached(ids.generate(), "build", ProcessPriority::High),
            Process::detached(ids.generate(), "test", ProcessPriority::Low),
        ];
        let output = render_process_list(&processes);
        let expected = format!(
            "Process list:\n    0. ▲ {} [high] build\n    1. ▽ {} [low] test\n",
            processes[0].id(),
            processes[1].id()
        );
        assert_eq!(output, expected);
    }
}
