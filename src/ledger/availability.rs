//! Non-overcommit checks shared by every store.
//!
//! For each item the quantity tied up in `Borrowed` loans may never exceed the
//! item's total quantity. Stores call these checks while holding whatever lock
//! serialises writers to the affected items, immediately before they write.

use std::collections::HashMap;

use uuid::Uuid;

use crate::error::{AppError, AppResult, Shortfall};
use crate::models::{Availability, LineView};

/// Verifies every line fits into the current availability of its item.
///
/// Items missing from `stock` are not visible to the caller and yield
/// `NotFound`. All short lines are reported together.
pub fn check_lines(lines: &[LineView], stock: &HashMap<Uuid, Availability>) -> AppResult<()> {
    let mut shortfalls = Vec::new();
    for view in lines {
        let line = &view.line;
        let avail = stock
            .get(&line.item_id)
            .ok_or_else(AppError::item_not_found)?;
        let requested = i64::from(line.quantity);
        if requested > avail.available() {
            shortfalls.push(Shortfall {
                item_id: line.item_id,
                requested,
                available: avail.available().max(0),
            });
        }
    }
    if shortfalls.is_empty() {
        Ok(())
    } else {
        Err(AppError::InsufficientAvailability(shortfalls))
    }
}

/// A new total quantity may not drop below what is currently lent out.
pub fn check_total(item_id: Uuid, new_total: i32, borrowed: i64) -> AppResult<()> {
    if i64::from(new_total) < borrowed {
        return Err(AppError::InsufficientAvailability(vec![Shortfall {
            item_id,
            requested: borrowed,
            available: i64::from(new_total),
        }]));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LoanLineItem;

    fn line(item_id: Uuid, quantity: i32) -> LineView {
        LineView {
            line: LoanLineItem {
                id: Uuid::new_v4(),
                loan_id: Uuid::nil(),
                item_id,
                quantity,
                position: 0,
            },
            photo: None,
        }
    }

    fn stock(entries: &[(Uuid, i32, i64)]) -> HashMap<Uuid, Availability> {
        entries
            .iter()
            .map(|&(item_id, total, borrowed)| (item_id, Availability { item_id, total, borrowed }))
            .collect()
    }

    #[test]
    fn test_exact_fit_is_accepted() {
        let item = Uuid::new_v4();
        let stock = stock(&[(item, 10, 7)]);
        assert!(check_lines(&[line(item, 3)], &stock).is_ok());
    }

    #[test]
    fn test_fully_lent_item_rejects_one_more() {
        let item = Uuid::new_v4();
        let stock = stock(&[(item, 5, 5)]);
        match check_lines(&[line(item, 1)], &stock) {
            Err(AppError::InsufficientAvailability(s)) => {
                assert_eq!(s, vec![Shortfall { item_id: item, requested: 1, available: 0 }]);
            }
            other => panic!("expected shortfall, got {:?}", other),
        }
    }

    #[test]
    fn test_reports_every_short_line() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        let stock = stock(&[(a, 2, 0), (b, 4, 3), (c, 1, 0)]);
        let err = check_lines(&[line(a, 3), line(c, 1), line(b, 2)], &stock).unwrap_err();
        match err {
            AppError::InsufficientAvailability(s) => {
                let ids: Vec<Uuid> = s.iter().map(|s| s.item_id).collect();
                assert_eq!(ids, vec![a, b]);
            }
            other => panic!("expected shortfall, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_item_is_not_found() {
        let err = check_lines(&[line(Uuid::new_v4(), 1)], &HashMap::new()).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_total_below_borrowed() {
        let item = Uuid::new_v4();
        assert!(check_total(item, 4, 4).is_ok());
        assert!(matches!(
            check_total(item, 3, 4),
            Err(AppError::InsufficientAvailability(_))
        ));
    }
}
