use rust_decimal::Decimal;

use crate::{
    dto::settings::UpdateSettingsRequest,
    error::{AppError, AppResult},
    middleware::auth::{Session, ensure_head_admin},
    models::{SETTINGS_ID, Settings},
    response::{ApiResponse, Meta},
    state::AppState,
    store::{local::keys, mapping},
};

/// Current settings. Remote first when active, then the local copy, then defaults.
pub async fn load_settings(state: &AppState) -> Settings {
    if let Some(client) = state.store.remote_client() {
        match client.fetch_all(&mapping::SETTINGS).await {
            Ok(rows) => {
                let remote = rows
                    .iter()
                    .map(|row| mapping::SETTINGS.from_row(row))
                    .filter_map(|value| serde_json::from_value::<Settings>(value).ok())
                    .find(|s| s.id == SETTINGS_ID);
                if let Some(settings) = remote {
                    if let Err(err) = state.store.local().save_value(keys::SETTINGS, &settings).await {
                        tracing::warn!(error = %err, "local settings refresh failed");
                    }
                    return settings;
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "remote settings read failed, using local copy");
            }
        }
    }
    state
        .store
        .local()
        .load_value::<Settings>(keys::SETTINGS)
        .await
        .unwrap_or_default()
}

/// Writes the singleton. Remote mode upserts row 1; the local copy follows.
pub async fn store_settings(state: &AppState, mut settings: Settings) -> AppResult<Settings> {
    settings.id = SETTINGS_ID;
    if let Some(client) = state.store.remote_client() {
        let value = serde_json::to_value(&settings).map_err(|e| AppError::Internal(e.into()))?;
        client
            .upsert(&mapping::SETTINGS, &mapping::SETTINGS.to_row(&value))
            .await?;
        if let Err(err) = state.store.local().save_value(keys::SETTINGS, &settings).await {
            tracing::warn!(error = %err, "local settings mirror failed");
        }
        return Ok(settings);
    }
    state.store.local().save_value(keys::SETTINGS, &settings).await?;
    Ok(settings)
}

/// Stores default settings when none exist locally or remotely.
pub async fn provision_default_settings(state: &AppState) -> AppResult<()> {
    let exists_locally = state
        .store
        .local()
        .load_value::<Settings>(keys::SETTINGS)
        .await
        .is_some();
    if exists_locally && !state.store.is_remote_active() {
        return Ok(());
    }
    let settings = load_settings(state).await;
    store_settings(state, settings).await?;
    Ok(())
}

pub async fn get_settings(state: &AppState) -> AppResult<ApiResponse<Settings>> {
    let settings = load_settings(state).await;
    Ok(ApiResponse::success("Settings", settings, None))
}

pub async fn update_settings(
    state: &AppState,
    session: &Session,
    payload: UpdateSettingsRequest,
) -> AppResult<ApiResponse<Settings>> {
    ensure_head_admin(session)?;
    let mut settings = load_settings(state).await;

    if let Some(name) = payload.store_name {
        settings.store_name = name;
    }
    if let Some(address) = payload.store_address {
        settings.store_address = address;
    }
    if let Some(phone) = payload.store_phone {
        settings.store_phone = phone;
    }
    if let Some(email) = payload.store_email {
        settings.store_email = email;
    }
    if let Some(fee) = payload.delivery_fee {
        if fee.is_sign_negative() {
            return Err(AppError::validation("Delivery fee cannot be negative"));
        }
        settings.delivery_fee = fee;
    }
    if let Some(commission) = payload.reseller_commission {
        if commission.is_sign_negative() || commission > Decimal::ONE_HUNDRED {
            return Err(AppError::validation(
                "Reseller commission must be between 0 and 100",
            ));
        }
        settings.reseller_commission = commission;
    }
    if let Some(auto_approval) = payload.auto_approval {
        settings.auto_approval = auto_approval;
    }

    let settings = store_settings(state, settings).await?;
    tracing::info!(by = %session.username, "settings updated");
    Ok(ApiResponse::success("Settings saved", settings, Some(Meta::empty())))
}
