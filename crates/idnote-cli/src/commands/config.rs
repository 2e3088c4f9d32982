use std::env;

use idnote_core::config::{ENV_SUPABASE_ANON_KEY, ENV_SUPABASE_URL, ENV_TABLE};
use idnote_core::util::{is_http_url, normalize_text_option};
use idnote_core::CachePolicy;

use crate::cli::ConfigCommands;
use crate::config_profiles::{CliProfile, CliProfilesConfig};
use crate::error::CliError;

/// Values supplied to `config init`; unset fields fall back to env, then the stored profile.
#[derive(Debug, Default)]
pub struct ProfileInit {
    pub profile: Option<String>,
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub table: Option<String>,
    pub no_cache: bool,
    pub no_activate: bool,
}

pub fn run_config(command: ConfigCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            supabase_url,
            supabase_anon_key,
            table,
            no_cache,
            no_activate,
        } => run_config_init(ProfileInit {
            profile: global_profile.map(str::to_string),
            supabase_url,
            supabase_anon_key,
            table,
            no_cache,
            no_activate,
        }),
        ConfigCommands::Show => run_config_show(global_profile),
    }
}

pub fn run_config_init(init: ProfileInit) -> Result<(), CliError> {
    let mut config = CliProfilesConfig::load()?;
    let profile_name = apply_profile_init(&mut config, init)?;

    let path = config.save()?;
    println!(
        "Profile '{}' initialized at {}",
        profile_name,
        path.display()
    );

    let profile = config
        .profile(&profile_name)
        .ok_or_else(|| CliError::Config("Failed to persist profile".to_string()))?;
    let missing_fields = missing_fields(profile);
    if missing_fields.is_empty() {
        println!("Profile '{profile_name}' is ready. Run `idnote` to open the shell.");
    } else {
        println!(
            "Profile '{}' is missing: {}",
            profile_name,
            missing_fields.join(", ")
        );
    }

    Ok(())
}

/// Merge `init` into `config` and return the name of the profile it touched.
pub fn apply_profile_init(
    config: &mut CliProfilesConfig,
    init: ProfileInit,
) -> Result<String, CliError> {
    let profile_name = config.resolve_profile_name(init.profile.as_deref());
    let existing_profile = config.profile(&profile_name).cloned().unwrap_or_default();

    let merged_supabase_url = normalize_text_option(init.supabase_url)
        .or_else(|| normalize_text_option(env::var(ENV_SUPABASE_URL).ok()))
        .or_else(|| existing_profile.supabase_url());
    let merged_supabase_anon_key = normalize_text_option(init.supabase_anon_key)
        .or_else(|| normalize_text_option(env::var(ENV_SUPABASE_ANON_KEY).ok()))
        .or_else(|| existing_profile.supabase_anon_key());
    let merged_table = normalize_text_option(init.table)
        .or_else(|| normalize_text_option(env::var(ENV_TABLE).ok()))
        .or_else(|| normalize_text_option(existing_profile.table.clone()));

    let profile = config.profile_mut_or_default(&profile_name);
    profile.supabase_url = merged_supabase_url.map(|url| url.trim_end_matches('/').to_string());
    profile.supabase_anon_key = merged_supabase_anon_key;
    profile.table = merged_table;
    if init.no_cache {
        profile.cache_policy = CachePolicy::Remote;
    }

    validate_profile(profile)?;

    if !init.no_activate {
        config.active_profile = Some(profile_name.clone());
    }
    Ok(profile_name)
}

pub fn run_config_show(profile_name: Option<&str>) -> Result<(), CliError> {
    let config = CliProfilesConfig::load()?;
    let profile_name = config.resolve_profile_name(profile_name);
    let profile = config.profile(&profile_name).cloned().unwrap_or_default();
    println!("{}", describe_profile(&profile_name, &profile));
    Ok(())
}

pub fn describe_profile(name: &str, profile: &CliProfile) -> String {
    let unset = || "(unset)".to_string();
    let policy = match profile.cache_policy {
        CachePolicy::PreferCache => "prefer_cache",
        CachePolicy::Remote => "remote",
    };
    [
        format!("profile:           {name}"),
        format!(
            "supabase_url:      {}",
            profile.supabase_url().unwrap_or_else(unset)
        ),
        format!(
            "supabase_anon_key: {}",
            profile
                .supabase_anon_key()
                .map_or_else(unset, |_| "[REDACTED]".to_string())
        ),
        format!(
            "table:             {}",
            normalize_text_option(profile.table.clone()).unwrap_or_else(unset)
        ),
        format!("cache_policy:      {policy}"),
    ]
    .join("\n")
}

fn missing_fields(profile: &CliProfile) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if profile.supabase_url().is_none() {
        missing.push("supabase_url");
    }
    if profile.supabase_anon_key().is_none() {
        missing.push("supabase_anon_key");
    }
    missing
}

fn validate_profile(profile: &CliProfile) -> Result<(), CliError> {
    if let Some(url) = profile.supabase_url() {
        if !is_http_url(&url) {
            return Err(CliError::Config(
                "supabase_url must include http:// or https://".to_string(),
            ));
        }
    }
    Ok(())
}
