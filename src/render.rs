//! Plain-text rendering of table states and recorded plans.

use crate::actions::Step;
use crate::blocks::{Location, TableState};

/// Formats the table as four labelled columns, tallest level first, with
/// `.` marking empty cells. An empty table still gets one row of dots.
pub fn format_table(table: &TableState) -> String {
    let tallest = Location::ALL
        .iter()
        .map(|&location| table.stack(location).len())
        .max()
        .unwrap_or(0)
        .max(1);

    let mut output = String::new();
    for (i, location) in Location::ALL.iter().enumerate() {
        if i > 0 {
            output.push_str("  ");
        }
        output.push_str(&location.to_string());
    }

    // rows from the highest occupied level down to the table surface
    for height in (0..tallest).rev() {
        let mut row = String::new();
        for &location in &Location::ALL {
            let cell = table
                .stack(location)
                .get(height)
                .map_or_else(|| ".".to_string(), |block| block.symbol.to_string());
            row.push_str(&cell);
            row.push_str("   ");
        }
        output.push('\n');
        output.push_str(row.trim_end());
    }

    output
}

/// Formats a recorded plan as a numbered step list, one step per line.
pub fn format_plan(plan: &[Step]) -> String {
    plan.iter()
        .enumerate()
        .map(|(number, step)| format!("{}. {step}", number + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::Symbol;

    const A: Symbol = Symbol::new('A');
    const B: Symbol = Symbol::new('B');
    const C: Symbol = Symbol::new('C');
    const D: Symbol = Symbol::new('D');

    #[test]
    fn table_renders_columns_bottom_up() {
        let table = TableState::from_layout([vec![A], vec![B], vec![C, D], vec![]]);
        insta::assert_snapshot!(format_table(&table), @r"
        L1  L2  L3  L4
        .   .   D   .
        A   B   C   .
        ");
    }

    #[test]
    fn an_empty_table_still_shows_its_columns() {
        insta::assert_snapshot!(format_table(&TableState::new()), @r"
        L1  L2  L3  L4
        .   .   .   .
        ");
    }

    #[test]
    fn plans_are_numbered_from_one() {
        let plan = vec![
            Step::PickUp(A),
            Step::Move(Location::L4),
            Step::PutDown(A, Location::L4),
        ];
        insta::assert_snapshot!(format_plan(&plan), @r"
        1. pick up A
        2. move to L4
        3. put down A at L4
        ");
    }

    #[test]
    fn an_empty_plan_renders_as_nothing() {
        assert_eq!(format_plan(&[]), "");
    }
}
