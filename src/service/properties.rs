//! Random operation sequences checked against the ordering rules after
//! every step.

use super::test_support::*;
use super::{ListFilter, Planner};
use crate::domain::{Column, Item, ItemStatus, ReorderDirection, Target};
use chrono::NaiveDate;
use proptest::prelude::*;
use uuid::Uuid;

/// Two past days, today, tomorrow and the four backlog buckets
fn columns() -> Vec<Column> {
    vec![
        Column::Day(date(2025, 1, 8)),
        Column::Day(date(2025, 1, 9)),
        Column::Day(date(2025, 1, 10)),
        Column::Day(date(2025, 1, 11)),
        Column::Backlog(0),
        Column::Backlog(1),
        Column::Backlog(2),
        Column::Backlog(3),
    ]
}

const COLUMN_COUNT: usize = 8;

fn today() -> NaiveDate {
    date(2025, 1, 10)
}

#[derive(Debug, Clone)]
enum Op {
    Add(usize),
    Complete(usize),
    Reopen(usize),
    Move(usize, usize),
    Reorder(usize, bool),
    Rollover,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..COLUMN_COUNT).prop_map(Op::Add),
        2 => (0usize..64).prop_map(Op::Complete),
        1 => (0usize..64).prop_map(Op::Reopen),
        2 => (0usize..64, 0..COLUMN_COUNT).prop_map(|(n, c)| Op::Move(n, c)),
        2 => (0usize..64, any::<bool>()).prop_map(|(n, up)| Op::Reorder(n, up)),
        1 => Just(Op::Rollover),
    ]
}

fn listing(planner: &Planner, column: Column) -> Vec<Item> {
    let filter = match column {
        Column::Day(date) => ListFilter::Day(date),
        Column::Backlog(c) => ListFilter::BacklogColumn(c),
    };
    planner.list_items(filter, true).unwrap()
}

fn snapshot(planner: &Planner) -> Vec<Vec<Item>> {
    columns().into_iter().map(|c| listing(planner, c)).collect()
}

fn ids_with_status(items: &[Item], status: ItemStatus) -> Vec<Uuid> {
    items
        .iter()
        .filter(|i| i.status == status)
        .map(|i| i.id)
        .collect()
}

/// The item is the first of its status group in its column
fn is_group_head(planner: &Planner, id: Uuid) -> bool {
    let item = planner.get_item(id).unwrap();
    listing(planner, item.column())
        .iter()
        .find(|i| i.status == item.status)
        .map(|i| i.id)
        == Some(id)
}

fn check_ordering(planner: &Planner) -> Result<(), TestCaseError> {
    for column in columns() {
        let items = listing(planner, column);
        let first_done = items.iter().position(Item::is_done).unwrap_or(items.len());
        prop_assert!(items[first_done..].iter().all(Item::is_done));

        for group in [&items[..first_done], &items[first_done..]] {
            prop_assert!(group.windows(2).all(|w| w[0].order_index <= w[1].order_index));
        }
    }
    Ok(())
}

fn check_rollover(planner: &mut Planner) -> Result<(), TestCaseError> {
    let before = snapshot(planner);
    let today_column = Column::Day(today());

    let mut overdue: Vec<Item> = before[..2]
        .iter()
        .flatten()
        .filter(|i| !i.is_done())
        .cloned()
        .collect();
    overdue.sort_by_key(|i| (i.order_index, i.scheduled_for));

    let mut expected = ids_with_status(&listing(planner, today_column), ItemStatus::Pending);
    expected.extend(overdue.iter().map(|i| i.id));

    let moved = planner.rollover(today()).unwrap();
    prop_assert_eq!(moved, overdue.len());

    let after = snapshot(planner);
    prop_assert_eq!(
        ids_with_status(&listing(planner, today_column), ItemStatus::Pending),
        expected
    );
    for past in &after[..2] {
        prop_assert!(past.iter().all(Item::is_done));
    }
    // Backlog buckets and done items are never touched
    prop_assert_eq!(&after[4..], &before[4..]);
    let done = |columns: &[Vec<Item>]| -> Vec<Item> {
        let mut items: Vec<Item> = columns.iter().flatten().filter(|i| i.is_done()).cloned().collect();
        items.sort_by_key(|i| i.id);
        items
    };
    prop_assert_eq!(done(&after), done(&before));

    prop_assert_eq!(planner.rollover(today()).unwrap(), 0);
    prop_assert_eq!(snapshot(planner), after);
    Ok(())
}

fn apply(planner: &mut Planner, ids: &mut Vec<Uuid>, op: &Op) -> Result<(), TestCaseError> {
    let columns = columns();
    if ids.is_empty() && !matches!(op, Op::Add(_)) {
        return Ok(());
    }

    match *op {
        Op::Add(c) => {
            let target = match columns[c] {
                Column::Day(date) => Target::Date(date),
                Column::Backlog(b) => Target::Backlog(b),
            };
            let item = planner.add_item("task", target, None, None).unwrap();
            ids.push(item.id);
            prop_assert!(is_group_head(planner, item.id));
        }
        Op::Complete(n) => {
            let before = planner.get_item(ids[n % ids.len()]).unwrap();
            let after = planner.complete(before.id).unwrap();
            prop_assert_eq!(after.status, ItemStatus::Done);
            if !before.is_done() {
                prop_assert_eq!(after.scheduled_for, before.scheduled_for.or(Some(today())));
                let column = listing(planner, after.column());
                prop_assert_eq!(column.last().map(|i| i.id), Some(after.id));
            }
        }
        Op::Reopen(n) => {
            let before = planner.get_item(ids[n % ids.len()]).unwrap();
            let after = planner.reopen(before.id).unwrap();
            prop_assert_eq!(after.status, ItemStatus::Pending);
            prop_assert_eq!(after.scheduled_for, before.scheduled_for);
            if before.is_done() {
                prop_assert!(is_group_head(planner, after.id));
            }
        }
        Op::Move(n, c) => {
            let before = planner.get_item(ids[n % ids.len()]).unwrap();
            let after = planner.move_item(before.id, columns[c]).unwrap();
            prop_assert_eq!(after.column(), columns[c]);
            prop_assert_eq!(after.status, before.status);
            if before.column() != columns[c] {
                prop_assert!(is_group_head(planner, after.id));
            }
        }
        Op::Reorder(n, up) => {
            let item = planner.get_item(ids[n % ids.len()]).unwrap();
            let mut expected = ids_with_status(&listing(planner, item.column()), item.status);
            let pos = expected.iter().position(|id| *id == item.id).unwrap();
            let (direction, neighbour) = if up {
                (ReorderDirection::Up, pos.checked_sub(1))
            } else {
                (ReorderDirection::Down, Some(pos + 1).filter(|i| *i < expected.len()))
            };
            if let Some(neighbour) = neighbour {
                expected.swap(pos, neighbour);
            }

            planner.reorder_item(item.id, direction).unwrap();
            prop_assert_eq!(
                ids_with_status(&listing(planner, item.column()), item.status),
                expected
            );
        }
        Op::Rollover => check_rollover(planner)?,
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(96))]

    #[test]
    fn test_ordering_holds_after_every_operation(ops in prop::collection::vec(arb_op(), 1..48)) {
        let mut planner = planner();
        let mut ids = Vec::new();

        for op in &ops {
            apply(&mut planner, &mut ids, op)?;
            check_ordering(&planner)?;
        }

        let total: usize = snapshot(&planner).iter().map(Vec::len).sum();
        prop_assert_eq!(total, ids.len());
    }

    #[test]
    fn test_newest_add_is_always_on_top(columns_picked in prop::collection::vec(0..COLUMN_COUNT, 1..24)) {
        let mut planner = planner();
        let columns = columns();

        for c in columns_picked {
            let target = match columns[c] {
                Column::Day(date) => Target::Date(date),
                Column::Backlog(b) => Target::Backlog(b),
            };
            let item = planner.add_item("task", target, None, None).unwrap();
            prop_assert_eq!(listing(&planner, columns[c])[0].id, item.id);
        }
    }
}
