use chrono::Utc;

use crate::{
    dto::customers::{CreateCustomerRequest, CustomerHistory, CustomerView, UpdateCustomerRequest},
    error::{AppError, AppResult},
    middleware::auth::{Session, ensure_head_admin},
    models::{Customer, Order, new_id},
    response::{ApiResponse, Meta},
    state::AppState,
};

fn validate_customer(customer: &Customer) -> AppResult<()> {
    if customer.name.trim().is_empty() {
        return Err(AppError::validation("Customer name is required"));
    }
    if !is_valid_email(&customer.email) {
        return Err(AppError::validation("A valid email is required"));
    }
    if customer.age.is_some_and(|age| !(0..=150).contains(&age)) {
        return Err(AppError::validation("Age is out of range"));
    }
    Ok(())
}

pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.starts_with('.')
                && domain.contains('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

pub fn same_email(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

pub async fn list_customers(state: &AppState) -> AppResult<ApiResponse<Vec<CustomerView>>> {
    let snapshot = state.store.repo::<Customer>().load_snapshot().await;
    let items: Vec<CustomerView> = snapshot.items.into_iter().map(CustomerView::from).collect();
    let meta = Meta {
        degraded: snapshot.degraded.then_some(true),
        ..Meta::total(items.len())
    };
    Ok(ApiResponse::success("Customers", items, Some(meta)))
}

pub async fn get_customer(state: &AppState, id: &str) -> AppResult<ApiResponse<CustomerView>> {
    let customer = state.store.repo::<Customer>().find(id).await?;
    Ok(ApiResponse::success("Customer", customer.into(), None))
}

pub async fn create_customer(
    state: &AppState,
    session: &Session,
    payload: CreateCustomerRequest,
) -> AppResult<ApiResponse<CustomerView>> {
    let customer = Customer {
        id: new_id("CUST"),
        name: payload.name.trim().to_string(),
        email: payload.email.trim().to_string(),
        phone: payload.phone,
        address: payload.address,
        barangay: payload.barangay,
        gender: payload.gender,
        age: payload.age,
        gov_id: payload.gov_id,
        selfie_verification: payload.selfie_verification,
        verification_status: payload.verification_status.map(|s| s.to_string()),
        created_at: Some(Utc::now()),
    };
    validate_customer(&customer)?;

    let repo = state.store.repo::<Customer>();
    if repo.load().await.iter().any(|c| same_email(&c.email, &customer.email)) {
        return Err(AppError::validation("A customer with this email already exists"));
    }
    let customer = repo.create(customer).await?;
    tracing::info!(customer_id = %customer.id, by = %session.username, "customer created");
    Ok(ApiResponse::success("Customer created", customer.into(), Some(Meta::empty())))
}

pub async fn update_customer(
    state: &AppState,
    session: &Session,
    id: &str,
    payload: UpdateCustomerRequest,
) -> AppResult<ApiResponse<CustomerView>> {
    let repo = state.store.repo::<Customer>();
    let mut customer = repo.find(id).await?;

    if let Some(name) = payload.name {
        customer.name = name.trim().to_string();
    }
    if let Some(email) = payload.email {
        customer.email = email.trim().to_string();
    }
    if let Some(phone) = payload.phone {
        customer.phone = phone;
    }
    if let Some(address) = payload.address {
        customer.address = address;
    }
    if let Some(barangay) = payload.barangay {
        customer.barangay = barangay;
    }
    if let Some(gender) = payload.gender {
        customer.gender = gender;
    }
    if payload.age.is_some() {
        customer.age = payload.age;
    }
    if payload.gov_id.is_some() {
        customer.gov_id = payload.gov_id;
    }
    if payload.selfie_verification.is_some() {
        customer.selfie_verification = payload.selfie_verification;
    }
    if let Some(status) = payload.verification_status {
        customer.verification_status = Some(status.to_string());
    }
    validate_customer(&customer)?;

    let customer = repo.update(customer).await?;
    tracing::info!(customer_id = %customer.id, by = %session.username, "customer updated");
    Ok(ApiResponse::success("Customer updated", customer.into(), Some(Meta::empty())))
}

pub async fn delete_customer(
    state: &AppState,
    session: &Session,
    id: &str,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_head_admin(session)?;
    state.store.repo::<Customer>().delete(id).await?;
    tracing::info!(customer_id = %id, by = %session.username, "customer deleted");
    Ok(ApiResponse::success(
        "Customer deleted",
        serde_json::json!({ "id": id }),
        Some(Meta::empty()),
    ))
}

/// The customer with every order placed under the same email.
pub async fn customer_history(
    state: &AppState,
    id: &str,
) -> AppResult<ApiResponse<CustomerHistory>> {
    let customer = state.store.repo::<Customer>().find(id).await?;
    let mut orders: Vec<Order> = state
        .store
        .repo::<Order>()
        .load()
        .await
        .into_iter()
        .filter(|o| same_email(&o.customer.email, &customer.email))
        .collect();
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let data = CustomerHistory {
        customer: customer.into(),
        orders,
    };
    Ok(ApiResponse::success("Customer history", data, None))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape_checks() {
        assert!(is_valid_email("john@example.com"));
        assert!(!is_valid_email("john@example"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("jo hn@example.com"));
        assert!(same_email(" John@Example.com", "john@example.com "));
    }
}
