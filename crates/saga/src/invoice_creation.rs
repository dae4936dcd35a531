//! Invoice creation saga constants.

/// The saga type identifier for invoice creation.
pub const SAGA_TYPE: &str = "InvoiceCreation";

/// Step name: Create the invoice record in the accounting service.
pub const STEP_CREATE_INVOICE: &str = "create_invoice";

/// Step name: Generate and store the invoice PDF.
pub const STEP_GENERATE_PDF: &str = "generate_pdf";
