// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use time::{Date, Month};

use crate::{Lease, LeaseStatus, Payment, PaymentStatus, Property, PropertyStatus};

pub const INCOME_MONTHS: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthBucket {
    pub year: i32,
    pub month: Month,
    pub total_cents: i64,
    pub count: usize,
}

impl MonthBucket {
    pub fn label(&self) -> String {
        format!("{}-{:02}", self.year, u8::from(self.month))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub properties_total: usize,
    pub properties_available: usize,
    pub properties_rented: usize,
    pub properties_maintenance: usize,
    pub tenants_total: usize,
    pub active_leases: usize,
    pub pending_payments: usize,
    pub late_payments: usize,
    pub income: Vec<MonthBucket>,
}

impl DashboardSnapshot {
    pub fn build(
        properties: &[Property],
        tenant_count: usize,
        leases: &[Lease],
        payments: &[Payment],
        today: Date,
    ) -> Self {
        let count_status =
            |status: PropertyStatus| properties.iter().filter(|p| p.status == status).count();
        let count_payments =
            |status: PaymentStatus| payments.iter().filter(|p| p.status == status).count();
        Self {
            properties_total: properties.len(),
            properties_available: count_status(PropertyStatus::Available),
            properties_rented: count_status(PropertyStatus::Rented),
            properties_maintenance: count_status(PropertyStatus::Maintenance),
            tenants_total: tenant_count,
            active_leases: leases
                .iter()
                .filter(|lease| lease.status == LeaseStatus::Active)
                .count(),
            pending_payments: count_payments(PaymentStatus::Pending),
            late_payments: count_payments(PaymentStatus::Late),
            income: monthly_income(payments, today),
        }
    }

    pub fn income_total_cents(&self) -> i64 {
        self.income.iter().map(|bucket| bucket.total_cents).sum()
    }
}

/// Paid income per calendar month for the twelve months ending with
/// `today`'s month, oldest first. Months without payments are zero buckets.
pub fn monthly_income(payments: &[Payment], today: Date) -> Vec<MonthBucket> {
    let mut buckets = Vec::with_capacity(INCOME_MONTHS);
    let (mut year, mut month) = (today.year(), today.month());
    for _ in 0..INCOME_MONTHS {
        buckets.push(MonthBucket {
            year,
            month,
            total_cents: 0,
            count: 0,
        });
        if month == Month::January {
            year -= 1;
        }
        month = month.previous();
    }
    buckets.reverse();

    for payment in payments {
        if payment.status != PaymentStatus::Paid {
            continue;
        }
        let key = (payment.paid_on.year(), payment.paid_on.month());
        if let Some(bucket) = buckets
            .iter_mut()
            .find(|bucket| (bucket.year, bucket.month) == key)
        {
            bucket.total_cents += payment.amount_cents;
            bucket.count += 1;
        }
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::{DashboardSnapshot, monthly_income};
    use crate::{
        LeaseId, Payment, PaymentId, PaymentMethod, PaymentStatus, Property, PropertyId,
        PropertyKind, PropertyStatus,
    };
    use time::Month;
    use time::macros::date;

    fn payment(id: i64, amount_cents: i64, paid_on: time::Date, status: PaymentStatus) -> Payment {
        Payment {
            id: PaymentId::new(id),
            lease_id: LeaseId::new(1),
            amount_cents,
            paid_on,
            method: PaymentMethod::Transfer,
            status,
            reference: String::new(),
            notes: String::new(),
            created_at: None,
            updated_at: None,
        }
    }

    fn property(id: i64, status: PropertyStatus) -> Property {
        Property {
            id: PropertyId::new(id),
            name: format!("Casa {id}"),
            address: "Av. Siempre Viva 742".to_owned(),
            city: "Lima".to_owned(),
            kind: PropertyKind::House,
            status,
            monthly_rent_cents: 150_000,
            bedrooms: None,
            bathrooms: None,
            area_m2: None,
            description: String::new(),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn twelve_buckets_ending_in_current_month_across_year_boundary() {
        let buckets = monthly_income(&[], date!(2026 - 03 - 15));
        assert_eq!(buckets.len(), 12);
        assert_eq!((buckets[0].year, buckets[0].month), (2025, Month::April));
        assert_eq!((buckets[11].year, buckets[11].month), (2026, Month::March));
        assert_eq!(buckets[8].label(), "2025-12");
        assert!(buckets.iter().all(|bucket| bucket.total_cents == 0));
    }

    #[test]
    fn only_paid_payments_inside_window_are_summed() {
        let payments = [
            payment(1, 100_000, date!(2026 - 03 - 01), PaymentStatus::Paid),
            payment(2, 50_000, date!(2026 - 03 - 20), PaymentStatus::Paid),
            payment(3, 70_000, date!(2026 - 03 - 05), PaymentStatus::Pending),
            payment(4, 30_000, date!(2025 - 04 - 30), PaymentStatus::Paid),
            payment(5, 99_000, date!(2025 - 03 - 31), PaymentStatus::Paid),
        ];
        let buckets = monthly_income(&payments, date!(2026 - 03 - 15));
        assert_eq!(buckets[11].total_cents, 150_000);
        assert_eq!(buckets[11].count, 2);
        assert_eq!(buckets[0].total_cents, 30_000);
        let total: i64 = buckets.iter().map(|bucket| bucket.total_cents).sum();
        assert_eq!(total, 180_000);
    }

    #[test]
    fn snapshot_counts_by_status() {
        let properties = [
            property(1, PropertyStatus::Available),
            property(2, PropertyStatus::Rented),
            property(3, PropertyStatus::Rented),
        ];
        let payments = [
            payment(1, 10_000, date!(2026 - 01 - 10), PaymentStatus::Late),
            payment(2, 10_000, date!(2026 - 01 - 10), PaymentStatus::Pending),
            payment(3, 10_000, date!(2026 - 01 - 10), PaymentStatus::Paid),
        ];
        let snapshot = DashboardSnapshot::build(&properties, 4, &[], &payments, date!(2026 - 01 - 31));
        assert_eq!(snapshot.properties_total, 3);
        assert_eq!(snapshot.properties_rented, 2);
        assert_eq!(snapshot.properties_maintenance, 0);
        assert_eq!(snapshot.tenants_total, 4);
        assert_eq!(snapshot.pending_payments, 1);
        assert_eq!(snapshot.late_payments, 1);
        assert_eq!(snapshot.income_total_cents(), 10_000);
    }
}
