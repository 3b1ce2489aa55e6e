mod common;

use common::{setup_test_env, ts};
use tally::{BudgetEdit, BudgetPeriod, CoreError, Event, Expense, LedgerError};

#[test]
fn facade_commands_undo_and_redo_in_order() {
    let today = ts(2019, 10, 15);
    let (mut manager, _) = setup_test_env(today);

    manager
        .add_budget("Food", 300.0, None)
        .expect("add budget with configured period");
    assert_eq!(manager.model().primary_budget().period(), BudgetPeriod::Month);
    let lunch = manager
        .apply(|m| m.add_expense(Expense::new("Lunch", 60.0, today)))
        .expect("add expense");
    manager
        .apply(|m| {
            m.edit_budget(
                "Food",
                BudgetEdit {
                    limit: Some(120.0),
                    ..BudgetEdit::default()
                },
            )
        })
        .expect("edit budget");
    assert!(manager.model().primary_budget().is_half());

    assert_eq!(manager.rollback().expect("undo edit"), "Edit budget Food");
    assert!(!manager.model().primary_budget().is_half());
    assert_eq!(
        manager.rollback().expect("undo expense"),
        "Add expense Lunch (60.00)"
    );
    assert!(manager.model().ledger().expense(lunch.id).is_none());

    assert_eq!(
        manager.migrate().expect("redo expense"),
        "Add expense Lunch (60.00)"
    );
    assert_eq!(manager.migrate().expect("redo edit"), "Edit budget Food");
    insta::assert_snapshot!(
        manager.model().primary_budget().to_string(),
        @"Food [Monthly: 2019-10-15 to 2019-11-14] 60.00 of 120.00 (50%) *primary*"
    );
    assert!(matches!(
        manager.migrate(),
        Err(LedgerError::Core(CoreError::NoFutureChanges))
    ));
}

#[test]
fn past_period_view_counts_only_that_period() {
    let today = ts(2019, 10, 15);
    let (mut manager, _) = setup_test_env(today);
    manager
        .add_budget("Food", 100.0, Some(BudgetPeriod::Month))
        .expect("add budget");
    for (day, price) in [(ts(2019, 9, 10), 95.0), (ts(2019, 10, 15), 20.0)] {
        manager
            .apply(|m| m.add_expense(Expense::new("Groceries", price, day)))
            .expect("add expense");
    }
    assert_eq!(manager.model().primary_budget().spent(), 20.0);

    manager
        .apply(|m| m.switch_window(ts(2019, 9, 1)))
        .expect("switch to the window holding September 1");
    let previous = manager.model().primary_budget();
    assert_eq!(previous.spent(), 95.0);
    assert!(previous.is_near());
    assert!(!previous.is_exceeded());

    let err = manager
        .apply(|m| m.switch_window(ts(2019, 12, 1)))
        .expect_err("December lies past the current window");
    assert!(matches!(err, LedgerError::Core(CoreError::FutureWindow { .. })));

    manager.rollback().expect("back to the current window");
    assert_eq!(manager.model().primary_budget().spent(), 20.0);
}

#[test]
fn events_scheduled_in_the_past_become_expenses() {
    let today = ts(2019, 10, 15);
    let (mut manager, _) = setup_test_env(today);
    let gym = manager
        .apply(|m| m.add_event(Event::new("Gym", 40.0, ts(2019, 10, 1))))
        .expect("add event");
    let expenses = manager
        .apply(|m| m.transpire_events())
        .expect("transpire");
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].id, gym.id);
    assert!(manager.model().events().is_empty());
}
