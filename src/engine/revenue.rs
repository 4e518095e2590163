use chrono::{Datelike, Duration, FixedOffset, NaiveDate};
use serde::Serialize;

use crate::models::order::{Order, OrderStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRevenue {
    pub day: String,
    pub date: NaiveDate,
    pub orders: usize,
    pub total: u64,
}

/// Delivered totals per day of the week containing `today`, Monday first.
/// Orders count toward the local day they were placed on.
pub fn weekly_revenue(orders: &[Order], today: NaiveDate, offset: &FixedOffset) -> Vec<DailyRevenue> {
    let monday = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));

    (0..7)
        .map(|index| {
            let date = monday + Duration::days(index);
            let delivered: Vec<&Order> = orders
                .iter()
                .filter(|order| order.status == OrderStatus::Delivered)
                .filter(|order| order.created_at.with_timezone(offset).date_naive() == date)
                .collect();

            DailyRevenue {
                day: date.format("%a").to_string(),
                date,
                orders: delivered.len(),
                total: delivered.iter().map(|order| order.total).sum(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};
    use uuid::Uuid;

    use super::weekly_revenue;
    use crate::models::order::OrderStatus;
    use crate::store::test_support::order_for;

    #[test]
    fn sums_delivered_orders_per_weekday() {
        let utc = FixedOffset::east_opt(0).unwrap();
        // Wednesday
        let today = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        let restaurant = Uuid::now_v7();

        let monday_noon = Utc.with_ymd_and_hms(2026, 10, 12, 12, 0, 0).unwrap();
        let wednesday = Utc.with_ymd_and_hms(2026, 10, 14, 9, 30, 0).unwrap();
        let last_week = Utc.with_ymd_and_hms(2026, 10, 9, 9, 30, 0).unwrap();

        let orders = vec![
            order_for(restaurant, OrderStatus::Delivered, monday_noon),
            order_for(restaurant, OrderStatus::Delivered, monday_noon),
            order_for(restaurant, OrderStatus::Delivered, wednesday),
            order_for(restaurant, OrderStatus::OnTheWay, wednesday),
            order_for(restaurant, OrderStatus::Delivered, last_week),
        ];

        let week = weekly_revenue(&orders, today, &utc);

        assert_eq!(week.len(), 7);
        assert_eq!(week[0].day, "Mon");
        assert_eq!(week[0].orders, 2);
        assert_eq!(week[0].total, 5000);
        assert_eq!(week[1].total, 0);
        assert_eq!(week[2].day, "Wed");
        assert_eq!(week[2].total, 2500);
        assert_eq!(week[6].day, "Sun");
        assert_eq!(week.iter().map(|day| day.orders).sum::<usize>(), 3);
    }

    #[test]
    fn days_follow_the_configured_offset() {
        // 23:30 UTC Monday is already Tuesday in Sydney
        let sydney = FixedOffset::east_opt(10 * 3600).unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        let late_monday = Utc.with_ymd_and_hms(2026, 10, 12, 23, 30, 0).unwrap();
        let orders = vec![order_for(Uuid::now_v7(), OrderStatus::Delivered, late_monday)];

        let week = weekly_revenue(&orders, today, &sydney);

        assert_eq!(week[0].total, 0);
        assert_eq!(week[1].total, 2500);
    }
}
