use pmb::output::{format_human, HumanOutput};

#[test]
fn format_human_includes_sections() {
    let mut human = HumanOutput::new("Task status updated");
    human.push_summary("Task", "t-1 Fix login bug");
    human.push_summary("Transition", "TODO -> IN_PROGRESS");
    human.push_detail("assignee dev@example.com");
    human.push_warning("task is overdue");
    human.push_next_step("pmb board --project p-1");

    let rendered = format_human(&human);
    assert!(rendered.contains("Task status updated"));
    assert!(rendered.contains("Summary:"));
    assert!(rendered.contains("- Task: t-1 Fix login bug"));
    assert!(rendered.contains("- Transition: TODO -> IN_PROGRESS"));
    assert!(rendered.contains("Details:"));
    assert!(rendered.contains("- assignee dev@example.com"));
    assert!(rendered.contains("Warnings:"));
    assert!(rendered.contains("- task is overdue"));
    assert!(rendered.contains("Next steps:"));
    assert!(rendered.contains("- pmb board --project p-1"));
}

#[test]
fn format_human_omits_empty_sections() {
    let human = HumanOutput::new("Task status unchanged");
    let rendered = format_human(&human);
    assert_eq!(rendered, "Task status unchanged");
}

#[test]
fn summary_entries_without_values_render_bare() {
    let mut human = HumanOutput::new("Organizations");
    human.push_summary("acme (Acme Corp)", "");

    let rendered = format_human(&human);
    assert!(rendered.contains("- acme (Acme Corp)"));
    assert!(!rendered.contains("- acme (Acme Corp):"));
}
