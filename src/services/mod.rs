pub mod analytics_service;
pub mod auth_service;
pub mod customer_service;
pub mod invoice_service;
pub mod member_service;
pub mod notification_service;
pub mod order_service;
pub mod product_service;
pub mod report_service;
pub mod settings_service;
pub mod stock_request_service;
pub mod storefront_service;
