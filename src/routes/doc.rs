use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        analytics::{DashboardStats, ResellerProfit, StatusCount},
        auth::{ChangePasswordRequest, LoginRequest, LoginResponse},
        customers::{CreateCustomerRequest, CustomerHistory, CustomerView, UpdateCustomerRequest},
        members::{CreateMemberRequest, UpdateMemberRequest},
        orders::{AssignOrderRequest, InvoiceIssued, UpdateOrderStatusRequest},
        products::{CreateProductRequest, SetStockRequest, UpdateProductRequest},
        requests::{CreateReportRequest, CreateStockRequest, GenerateReportRequest, RejectRequest},
        settings::UpdateSettingsRequest,
        storefront::{
            AddToCartRequest, CartView, CheckoutCustomer, CheckoutRequest, CheckoutResponse,
            MoveToCartRequest, UpdateCartLineRequest, WishlistToggleRequest, WishlistToggled,
        },
    },
    models::{
        CartLine, Customer, CustomerSnapshot, Delivery, DeliveryMethod, Invoice, InvoiceStatus,
        InvoiceType, MemberStatus, MemberView, Notification, Order, OrderItem, OrderStatus,
        Payment, PaymentMethod, Product, Report, ReportPayload, ReportRequest, ReportType,
        RequestStatus, Role, Settings, StockRequest, VerificationStatus,
    },
    response::{ApiResponse, Meta},
    routes::{
        analytics, auth, customers, health, invoices, members, notifications, orders, products,
        requests, settings, storefront,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::me,
        auth::change_password,
        members::list_members,
        members::list_resellers,
        members::create_member,
        members::update_member,
        members::delete_member,
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        products::set_stock,
        products::list_low_stock,
        customers::list_customers,
        customers::get_customer,
        customers::create_customer,
        customers::update_customer,
        customers::delete_customer,
        customers::customer_history,
        orders::list_orders,
        orders::get_order,
        orders::update_order_status,
        orders::assign_order,
        orders::generate_pre_invoice,
        orders::generate_real_invoice,
        invoices::list_invoices,
        invoices::get_invoice,
        invoices::verify_invoice,
        requests::create_stock_request,
        requests::list_stock_requests,
        requests::approve_stock_request,
        requests::reject_stock_request,
        requests::cancel_stock_request,
        requests::create_report_request,
        requests::list_report_requests,
        requests::approve_report_request,
        requests::reject_report_request,
        requests::generate_report,
        requests::list_reports,
        requests::get_report,
        notifications::list_notifications,
        notifications::unread_count,
        notifications::mark_read,
        notifications::mark_all_read,
        settings::get_settings,
        settings::update_settings,
        analytics::dashboard,
        analytics::status_breakdown,
        analytics::reseller_profit,
        storefront::view_cart,
        storefront::add_to_cart,
        storefront::update_cart_line,
        storefront::remove_cart_line,
        storefront::clear_cart,
        storefront::list_wishlist,
        storefront::toggle_wishlist,
        storefront::move_to_cart,
        storefront::checkout
    ),
    components(
        schemas(
            Role,
            MemberStatus,
            MemberView,
            Product,
            Customer,
            CustomerSnapshot,
            VerificationStatus,
            OrderItem,
            OrderStatus,
            Delivery,
            DeliveryMethod,
            Payment,
            PaymentMethod,
            Order,
            Invoice,
            InvoiceType,
            InvoiceStatus,
            RequestStatus,
            StockRequest,
            ReportType,
            ReportRequest,
            ReportPayload,
            Report,
            Notification,
            Settings,
            CartLine,
            LoginRequest,
            LoginResponse,
            ChangePasswordRequest,
            CreateMemberRequest,
            UpdateMemberRequest,
            CreateProductRequest,
            UpdateProductRequest,
            SetStockRequest,
            CustomerView,
            CreateCustomerRequest,
            UpdateCustomerRequest,
            CustomerHistory,
            UpdateOrderStatusRequest,
            AssignOrderRequest,
            InvoiceIssued,
            CreateStockRequest,
            RejectRequest,
            CreateReportRequest,
            GenerateReportRequest,
            UpdateSettingsRequest,
            DashboardStats,
            StatusCount,
            ResellerProfit,
            AddToCartRequest,
            UpdateCartLineRequest,
            CartView,
            WishlistToggleRequest,
            WishlistToggled,
            MoveToCartRequest,
            CheckoutCustomer,
            CheckoutRequest,
            CheckoutResponse,
            Meta,
            ApiResponse<Product>,
            ApiResponse<Order>,
            ApiResponse<Invoice>,
            ApiResponse<Settings>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Member sign-in and password"),
        (name = "Members", description = "Head admin and reseller accounts"),
        (name = "Products", description = "Catalog and stock"),
        (name = "Customers", description = "Customer records and verification"),
        (name = "Orders", description = "Order lifecycle"),
        (name = "Invoices", description = "Pre-invoices and invoices"),
        (name = "Stock Requests", description = "Reseller restock approval"),
        (name = "Reports", description = "Reseller sales reports"),
        (name = "Notifications", description = "Role and user notifications"),
        (name = "Settings", description = "Store settings"),
        (name = "Analytics", description = "Dashboard figures"),
        (name = "Storefront", description = "Cart, wishlist and checkout"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
