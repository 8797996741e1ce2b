use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use workforce::{
    config::ConfigLoader,
    crypto::{CryptoKey, SettingAad, is_sealed, seal_setting_value},
    db,
    models::integration_setting,
    services::integration::SECRET_SETTINGS,
};

#[tokio::main]
async fn main() -> Result<()> {
    let loader = ConfigLoader::new();
    let config = loader.load().context("loading configuration")?;

    let key_bytes = config
        .crypto_key
        .clone()
        .context("crypto key not present in configuration")?;
    let crypto_key = CryptoKey::new(key_bytes).context("initializing crypto key")?;

    let db = db::init_pool(&config)
        .await
        .context("initializing database connection pool")?;

    let settings = integration_setting::Entity::find()
        .filter(integration_setting::Column::SettingName.is_in(SECRET_SETTINGS.iter().copied()))
        .filter(integration_setting::Column::DeletedAt.is_null())
        .all(&db)
        .await
        .context("querying integration settings")?;

    let mut updated_count = 0usize;

    for setting in settings {
        if setting.setting_value.is_empty() || is_sealed(&setting.setting_value) {
            continue;
        }

        let setting_id = setting.id;
        let aad = SettingAad {
            tenant_id: setting.tenant_id,
            integration_id: setting.integration_id,
            setting_name: &setting.setting_name,
        };
        let sealed = seal_setting_value(&crypto_key, aad, &setting.setting_value)
            .map_err(|err| anyhow!("failed to seal setting {}: {}", setting_id, err))?;

        let mut active: integration_setting::ActiveModel = setting.into();
        active.setting_value = Set(sealed);
        active.updated_at = Set(Utc::now().into());

        active
            .update(&db)
            .await
            .with_context(|| format!("updating integration setting {}", setting_id))?;
        updated_count += 1;
    }

    println!(
        "Sealed {} integration setting(s) stored in plain text.",
        updated_count
    );

    Ok(())
}
