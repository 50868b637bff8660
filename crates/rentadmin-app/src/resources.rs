// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Engine configuration for each concrete resource.

use crate::filter::matches_any;
use crate::{
    EntityHooks, ErrorMessages, Lease, LeaseFormInput, Payment, PaymentFormInput, Property,
    PropertyFormInput, Tenant, TenantFormInput,
};

pub fn property_hooks() -> EntityHooks<Property, PropertyFormInput> {
    EntityHooks {
        resource: "property",
        id: |property| property.id.get(),
        name: |property| property.name.clone(),
        filter: |property, term| {
            matches_any(
                [
                    property.name.as_str(),
                    property.address.as_str(),
                    property.city.as_str(),
                    property.kind.as_str(),
                    property.status.as_str(),
                ],
                term,
            )
        },
        to_form: property_form,
        initial_form: PropertyFormInput::blank(),
        messages: ErrorMessages {
            load: "failed to load properties",
            save: "failed to save property",
            delete: "failed to delete property",
        },
    }
}

pub fn tenant_hooks() -> EntityHooks<Tenant, TenantFormInput> {
    EntityHooks {
        resource: "tenant",
        id: |tenant| tenant.id.get(),
        name: Tenant::full_name,
        filter: |tenant, term| {
            let full_name = tenant.full_name();
            matches_any(
                [
                    full_name.as_str(),
                    tenant.email.as_str(),
                    tenant.phone.as_str(),
                    tenant.document_number.as_str(),
                ],
                term,
            )
        },
        to_form: tenant_form,
        initial_form: TenantFormInput::blank(),
        messages: ErrorMessages {
            load: "failed to load tenants",
            save: "failed to save tenant",
            delete: "failed to delete tenant",
        },
    }
}

pub fn lease_hooks() -> EntityHooks<Lease, LeaseFormInput> {
    EntityHooks {
        resource: "lease",
        id: |lease| lease.id.get(),
        name: |lease| format!("lease #{}", lease.id),
        filter: |lease, term| {
            let id = lease.id.to_string();
            let property = lease.property_id.to_string();
            let tenant = lease.tenant_id.to_string();
            matches_any(
                [
                    id.as_str(),
                    property.as_str(),
                    tenant.as_str(),
                    lease.status.as_str(),
                    lease.notes.as_str(),
                ],
                term,
            )
        },
        to_form: lease_form,
        initial_form: LeaseFormInput::blank(),
        messages: ErrorMessages {
            load: "failed to load leases",
            save: "failed to save lease",
            delete: "failed to delete lease",
        },
    }
}

pub fn payment_hooks() -> EntityHooks<Payment, PaymentFormInput> {
    EntityHooks {
        resource: "payment",
        id: |payment| payment.id.get(),
        name: |payment| format!("payment #{}", payment.id),
        filter: |payment, term| {
            let lease = payment.lease_id.to_string();
            let paid_on = payment.paid_on.to_string();
            matches_any(
                [
                    lease.as_str(),
                    paid_on.as_str(),
                    payment.method.as_str(),
                    payment.status.as_str(),
                    payment.reference.as_str(),
                ],
                term,
            )
        },
        to_form: payment_form,
        initial_form: PaymentFormInput::blank(),
        messages: ErrorMessages {
            load: "failed to load payments",
            save: "failed to save payment",
            delete: "failed to delete payment",
        },
    }
}

pub fn property_form(property: &Property) -> PropertyFormInput {
    PropertyFormInput {
        name: property.name.clone(),
        address: property.address.clone(),
        city: property.city.clone(),
        kind: property.kind,
        status: property.status,
        monthly_rent_cents: property.monthly_rent_cents,
        bedrooms: property.bedrooms,
        bathrooms: property.bathrooms,
        area_m2: property.area_m2,
        description: property.description.clone(),
    }
}

pub fn tenant_form(tenant: &Tenant) -> TenantFormInput {
    TenantFormInput {
        first_name: tenant.first_name.clone(),
        last_name: tenant.last_name.clone(),
        email: tenant.email.clone(),
        phone: tenant.phone.clone(),
        document_number: tenant.document_number.clone(),
        notes: tenant.notes.clone(),
    }
}

pub fn lease_form(lease: &Lease) -> LeaseFormInput {
    LeaseFormInput {
        property_id: lease.property_id,
        tenant_id: lease.tenant_id,
        start_date: lease.start_date,
        end_date: lease.end_date,
        monthly_rent_cents: lease.monthly_rent_cents,
        deposit_cents: lease.deposit_cents,
        status: lease.status,
        notes: lease.notes.clone(),
    }
}

pub fn payment_form(payment: &Payment) -> PaymentFormInput {
    PaymentFormInput {
        lease_id: payment.lease_id,
        amount_cents: payment.amount_cents,
        paid_on: payment.paid_on,
        method: payment.method,
        status: payment.status,
        reference: payment.reference.clone(),
        notes: payment.notes.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::{lease_hooks, property_hooks, tenant_hooks};
    use crate::{
        Lease, LeaseId, LeaseStatus, Property, PropertyId, PropertyKind, PropertyStatus, Tenant,
        TenantId, normalize_term,
    };
    use time::macros::date;

    fn casa(id: i64, name: &str, city: &str) -> Property {
        Property {
            id: PropertyId::new(id),
            name: name.to_owned(),
            address: "Jr. Unión 100".to_owned(),
            city: city.to_owned(),
            kind: PropertyKind::Apartment,
            status: PropertyStatus::Available,
            monthly_rent_cents: 120_000,
            bedrooms: Some(2),
            bathrooms: Some(1),
            area_m2: Some(70),
            description: String::new(),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn property_filter_covers_name_and_city() {
        let hooks = property_hooks();
        let property = casa(1, "Casa A", "Arequipa");
        assert!((hooks.filter)(&property, &normalize_term("CASA a")));
        assert!((hooks.filter)(&property, &normalize_term("arequ")));
        assert!(!(hooks.filter)(&property, &normalize_term("cusco")));
        assert_eq!((hooks.name)(&property), "Casa A");
    }

    #[test]
    fn property_round_trips_through_form() {
        let hooks = property_hooks();
        let property = casa(3, "Loft", "Lima");
        let form = (hooks.to_form)(&property);
        assert_eq!(form.name, "Loft");
        assert_eq!(form.bedrooms, Some(2));
        assert_eq!(form.monthly_rent_cents, 120_000);
    }

    #[test]
    fn tenant_name_is_full_name() {
        let hooks = tenant_hooks();
        let tenant = Tenant {
            id: TenantId::new(5),
            first_name: "Juan".to_owned(),
            last_name: "Pérez".to_owned(),
            email: "juan@example.com".to_owned(),
            phone: String::new(),
            document_number: "40112233".to_owned(),
            notes: String::new(),
            created_at: None,
            updated_at: None,
        };
        assert_eq!((hooks.name)(&tenant), "Juan Pérez");
        assert!((hooks.filter)(&tenant, "juan pé"));
        assert!((hooks.filter)(&tenant, "4011"));
        assert_eq!((hooks.id)(&tenant), 5);
    }

    #[test]
    fn lease_name_uses_id() {
        let hooks = lease_hooks();
        let lease = Lease {
            id: LeaseId::new(12),
            property_id: PropertyId::new(1),
            tenant_id: TenantId::new(5),
            start_date: date!(2026 - 01 - 01),
            end_date: None,
            monthly_rent_cents: 120_000,
            deposit_cents: None,
            status: LeaseStatus::Active,
            notes: String::new(),
            created_at: None,
            updated_at: None,
        };
        assert_eq!((hooks.name)(&lease), "lease #12");
        assert!((hooks.filter)(&lease, "active"));
    }
}
