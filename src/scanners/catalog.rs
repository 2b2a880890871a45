//! Built-in scanner table for the ground-service catalog backend.
//!
//! Foreign-key column names differ per entity type, but the resources that
//! can hold a reference are largely the same, so the common tail is built
//! from one column mapping per type.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;

use super::{EntityTypeSpec, ScannerSpec};

/// Foreign-key columns a catalog type is referenced through, one per resource.
struct ReferenceColumns {
    services: &'static str,
    components: &'static [&'static str],
    service_per_customer: &'static str,
    work_orders: &'static str,
    quotes: &'static str,
    operation_report: &'static str,
    service_executions: &'static str,
    invoices: &'static str,
}

fn common_scanners(cols: &ReferenceColumns) -> Vec<ScannerSpec> {
    let mut scanners = vec![ScannerSpec::new(
        "/catalog/services",
        &[cols.services],
        "Service",
        "{service_code} - {service_name}",
        "id_service",
    )];

    // One scanner per component column.
    for column in cols.components {
        scanners.push(ScannerSpec::new(
            "/components",
            &[*column],
            "Component",
            "Component: {component_name|component_number|id}",
            "id",
        ));
    }

    scanners.extend([
        ScannerSpec::new(
            "/catalog/service-per-customer",
            &[cols.service_per_customer],
            "Customer Service",
            "Customer ID: {id_customer} - Service: {service_name|id_service}",
            "id_service_per_customer",
        ),
        work_orders(cols.work_orders),
        ScannerSpec::new(
            "/quotes",
            &[cols.quotes],
            "Quote",
            "Quote: {quote_number|id}",
            "id",
        ),
        ScannerSpec::new(
            "/reports/operation-report",
            &[cols.operation_report],
            "Operation Report",
            "Report: {cliente} - {servicio_principal}",
            "id",
        ),
        ScannerSpec::new(
            "/reports/service-executions",
            &[cols.service_executions],
            "Service Execution",
            "Execution: Work Order {work_order}",
            "id",
        ),
        invoices(cols.invoices),
    ]);

    scanners
}

fn work_orders(column: &str) -> ScannerSpec {
    ScannerSpec::new(
        "/work-orders",
        &[column],
        "Work Order",
        "Work Order: {work_order_number|id}",
        "id",
    )
}

fn invoices(column: &str) -> ScannerSpec {
    ScannerSpec::new(
        "/billing/invoices",
        &[column],
        "Invoice",
        "Invoice: {invoice_number|id}",
        "id",
    )
}

fn entity_type(
    noun: &str,
    delete_resource: &str,
    key_fields: &[&str],
    scanners: Vec<ScannerSpec>,
) -> EntityTypeSpec {
    EntityTypeSpec {
        noun: noun.to_string(),
        delete_resource: delete_resource.to_string(),
        key_fields: key_fields.iter().map(|f| f.to_string()).collect(),
        scanners,
    }
}

/// Entity types known without any configuration.
pub static BUILTIN_ENTITY_TYPES: Lazy<BTreeMap<String, EntityTypeSpec>> = Lazy::new(|| {
    let mut types = BTreeMap::new();

    // Components reference classifications under either column.
    let mut classification = common_scanners(&ReferenceColumns {
        services: "id_service_classification",
        components: &[],
        service_per_customer: "service_classification_id",
        work_orders: "service_classification_id",
        quotes: "service_classification_id",
        operation_report: "classification_id",
        service_executions: "classification_id",
        invoices: "classification_id",
    });
    classification.insert(
        1,
        ScannerSpec::new(
            "/components",
            &["id_service_classification", "classification_id"],
            "Component",
            "Component: {component_name|component_number|id}",
            "id",
        ),
    );
    types.insert(
        "service-classification".to_string(),
        entity_type(
            "service classification",
            "/catalog/service-classification",
            &["id_service_classification", "service_classification_name"],
            classification,
        ),
    );

    types.insert(
        "service-type".to_string(),
        entity_type(
            "service type",
            "/catalog/service-types",
            &["id_service_type", "service_type_name"],
            common_scanners(&ReferenceColumns {
                services: "id_service_type",
                components: &["id_service_type"],
                service_per_customer: "service_type_id",
                work_orders: "service_type_id",
                quotes: "service_type_id",
                operation_report: "type_id",
                service_executions: "type_id",
                invoices: "type_id",
            }),
        ),
    );

    types.insert(
        "service-include".to_string(),
        entity_type(
            "service include",
            "/catalog/service-includes",
            &["id_service_include", "service_include"],
            common_scanners(&ReferenceColumns {
                services: "id_service_include",
                components: &["id_service_include", "include_id"],
                service_per_customer: "service_include_id",
                work_orders: "service_include_id",
                quotes: "service_include_id",
                operation_report: "include_id",
                service_executions: "include_id",
                invoices: "include_id",
            }),
        ),
    );

    types.insert(
        "service-category".to_string(),
        entity_type(
            "service category",
            "/catalog/service-categories",
            &["id_service_category", "service_category_name"],
            vec![ScannerSpec::new(
                "/catalog/services",
                &["id_service_category"],
                "Service",
                "{service_code} - {service_name}",
                "id_service",
            )],
        ),
    );

    types.insert(
        "extra-service-assignment".to_string(),
        entity_type(
            "assignment",
            "/catalog/extra-service-sale-assignment",
            &["id_service", "work_order"],
            vec![
                work_orders("id_xtra_sale_employee"),
                invoices("id_xtra_sale_employee"),
                ScannerSpec::new(
                    "/timesheets",
                    &["id_xtra_sale_employee"],
                    "Timesheet",
                    "Timesheet: {date|id} - Employee: {employee_name|id_employee}",
                    "id",
                ),
            ],
        ),
    );

    // The backend's foreign keys are the only authority here.
    types.insert(
        "service-per-customer".to_string(),
        entity_type(
            "service per customer",
            "/catalog/service-per-customer",
            &["id_customer", "id_service"],
            Vec::new(),
        ),
    );

    types
});
