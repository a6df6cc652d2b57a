//! Plain-text output for tasks, statistics and notifications.

use taskdeck_core::{Notification, Task, TaskStats};

pub fn print_tasks(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("(no tasks)");
        return;
    }
    for task in tasks {
        println!("{}", task_line(task));
    }
}

pub fn print_task_detail(task: &Task) {
    println!("{}", task_line(task));
    if !task.description.is_empty() {
        println!("    {}", task.description);
    }
    println!("    created {}", task.created_at.to_rfc3339());
}

pub fn print_stats(stats: &TaskStats) {
    println!(
        "{} tasks, {} completed, {} pending ({}% done)",
        stats.total, stats.completed, stats.pending, stats.progress_percentage
    );
}

pub fn print_notifications(notifications: &[Notification]) {
    for notification in notifications {
        eprintln!("[{}] {}", notification.kind, notification.message);
    }
}

fn task_line(task: &Task) -> String {
    let mark = if task.completed { 'x' } else { ' ' };
    format!("[{mark}] #{} ({}) {}", task.id, task.priority, task.title)
}
