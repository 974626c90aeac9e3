//! Compiled-in configuration items

use crate::metadata::MetadataItem;
use crate::types::{group, ItemType};

pub const AUTH_MODE: &str = "auth_mode";
pub const CFG_CACHE_INTERVAL_SECONDS: &str = "cfg_cache_interval_seconds";
pub const CFG_EXPIRATION: &str = "cfg_expiration";
pub const DATABASE_TYPE: &str = "database_type";
pub const EXT_ENDPOINT: &str = "ext_endpoint";
pub const READ_ONLY: &str = "read_only";
pub const SELF_REGISTRATION: &str = "self_registration";
pub const TOKEN_EXPIRATION: &str = "token_expiration";
pub const PROJECT_CREATION_RESTRICTION: &str = "project_creation_restriction";
pub const WITH_NOTARY: &str = "with_notary";
pub const WITH_CLAIR: &str = "with_clair";
pub const WITH_CHARTMUSEUM: &str = "with_chartmuseum";

pub const LDAP_URL: &str = "ldap_url";
pub const LDAP_SEARCH_DN: &str = "ldap_search_dn";
pub const LDAP_SEARCH_PASSWORD: &str = "ldap_search_password";
pub const LDAP_BASE_DN: &str = "ldap_base_dn";
pub const LDAP_UID: &str = "ldap_uid";
pub const LDAP_FILTER: &str = "ldap_filter";
pub const LDAP_SCOPE: &str = "ldap_scope";
pub const LDAP_TIMEOUT: &str = "ldap_timeout";
pub const LDAP_VERIFY_CERT: &str = "ldap_verify_cert";
pub const LDAP_GROUP_MEMBERSHIP_ATTRIBUTE: &str = "ldap_group_membership_attribute";
pub const LDAP_GROUP_BASE_DN: &str = "ldap_group_base_dn";
pub const LDAP_GROUP_SEARCH_FILTER: &str = "ldap_group_search_filter";
pub const LDAP_GROUP_ATTRIBUTE_NAME: &str = "ldap_group_attribute_name";
pub const LDAP_GROUP_SEARCH_SCOPE: &str = "ldap_group_search_scope";
pub const LDAP_GROUP_ADMIN_DN: &str = "ldap_group_admin_dn";

pub const EMAIL_HOST: &str = "email_host";
pub const EMAIL_PORT: &str = "email_port";
pub const EMAIL_USERNAME: &str = "email_username";
pub const EMAIL_PASSWORD: &str = "email_password";
pub const EMAIL_FROM: &str = "email_from";
pub const EMAIL_SSL: &str = "email_ssl";
pub const EMAIL_IDENTITY: &str = "email_identity";
pub const EMAIL_INSECURE: &str = "email_insecure";

pub const POSTGRESQL_HOST: &str = "postgresql_host";
pub const POSTGRESQL_PORT: &str = "postgresql_port";
pub const POSTGRESQL_USERNAME: &str = "postgresql_username";
pub const POSTGRESQL_PASSWORD: &str = "postgresql_password";
pub const POSTGRESQL_DATABASE: &str = "postgresql_database";
pub const POSTGRESQL_SSLMODE: &str = "postgresql_sslmode";

pub const CLAIR_DB_HOST: &str = "clair_db_host";
pub const CLAIR_DB_PORT: &str = "clair_db_port";
pub const CLAIR_DB_USERNAME: &str = "clair_db_username";
pub const CLAIR_DB_PASSWORD: &str = "clair_db_password";
pub const CLAIR_DB: &str = "clair_db";
pub const CLAIR_DB_SSLMODE: &str = "clair_db_sslmode";

pub const UAA_ENDPOINT: &str = "uaa_endpoint";
pub const UAA_CLIENT_ID: &str = "uaa_client_id";
pub const UAA_CLIENT_SECRET: &str = "uaa_client_secret";
pub const UAA_VERIFY_CERT: &str = "uaa_verify_cert";

pub const HTTP_AUTHPROXY_ENDPOINT: &str = "http_authproxy_endpoint";
pub const HTTP_AUTHPROXY_TOKENREVIEW_ENDPOINT: &str = "http_authproxy_tokenreview_endpoint";
pub const HTTP_AUTHPROXY_VERIFY_CERT: &str = "http_authproxy_verify_cert";
pub const HTTP_AUTHPROXY_ALWAYS_ONBOARD: &str = "http_authproxy_always_onboard";

pub const OIDC_NAME: &str = "oidc_name";
pub const OIDC_ENDPOINT: &str = "oidc_endpoint";
pub const OIDC_CLIENT_ID: &str = "oidc_client_id";
pub const OIDC_CLIENT_SECRET: &str = "oidc_client_secret";
pub const OIDC_SCOPE: &str = "oidc_scope";
pub const OIDC_VERIFY_CERT: &str = "oidc_verify_cert";

pub const STORAGE_PER_PROJECT: &str = "storage_per_project";

/// The full list of items known to the admin server
pub fn default_items() -> Vec<MetadataItem> {
    use ItemType::*;
    use MetadataItem as Item;

    vec![
        // basic
        Item::system("admin_initial_password", group::BASIC, Password)
            .env("HARBOR_ADMIN_PASSWORD")
            .editable(),
        Item::system("admiral_url", group::BASIC, String).env("ADMIRAL_URL"),
        Item::user(AUTH_MODE, group::BASIC, AuthMode)
            .env("AUTH_MODE")
            .default_value("db_auth"),
        Item::system(CFG_EXPIRATION, group::BASIC, Int)
            .env("CFG_EXPIRATION")
            .default_value("5"),
        Item::system(CFG_CACHE_INTERVAL_SECONDS, group::BASIC, Int)
            .env("CFG_CACHE_INTERVAL_SECONDS")
            .default_value("0"),
        Item::system("chart_repository_url", group::BASIC, String)
            .env("CHART_REPOSITORY_URL")
            .default_value("http://chartmuseum:9999"),
        Item::system("core_url", group::BASIC, String)
            .env("CORE_URL")
            .default_value("http://core:8080"),
        Item::system(DATABASE_TYPE, group::BASIC, String)
            .env("DATABASE_TYPE")
            .default_value("postgresql"),
        Item::system(EXT_ENDPOINT, group::BASIC, String)
            .env("EXT_ENDPOINT")
            .default_value("https://host01.com"),
        Item::system("jobservice_url", group::BASIC, String)
            .env("JOBSERVICE_URL")
            .default_value("http://jobservice:8080"),
        Item::system("max_job_workers", group::BASIC, Int)
            .env("MAX_JOB_WORKERS")
            .default_value("10"),
        Item::system("notary_url", group::BASIC, String)
            .env("NOTARY_URL")
            .default_value("http://notary-server:4443"),
        Item::user("scan_all_policy", group::BASIC, Map),
        Item::user(PROJECT_CREATION_RESTRICTION, group::BASIC, ProjectCreationRestriction)
            .env("PROJECT_CREATION_RESTRICTION")
            .default_value("everyone"),
        Item::user(READ_ONLY, group::BASIC, Bool)
            .env("READ_ONLY")
            .default_value("false"),
        Item::system("registry_storage_provider_name", group::BASIC, String)
            .env("REGISTRY_STORAGE_PROVIDER_NAME")
            .default_value("filesystem"),
        Item::system("registry_url", group::BASIC, String)
            .env("REGISTRY_URL")
            .default_value("http://registry:5000"),
        Item::system("registry_controller_url", group::BASIC, String)
            .env("REGISTRY_CONTROLLER_URL")
            .default_value("http://registryctl:8080"),
        Item::user(SELF_REGISTRATION, group::BASIC, Bool)
            .env("SELF_REGISTRATION")
            .default_value("true"),
        Item::user(TOKEN_EXPIRATION, group::BASIC, Int)
            .env("TOKEN_EXPIRATION")
            .default_value("30"),
        Item::system("token_service_url", group::BASIC, String)
            .env("TOKEN_SERVICE_URL")
            .default_value("http://core:8080/service/token"),
        Item::system(WITH_CHARTMUSEUM, group::BASIC, Bool)
            .env("WITH_CHARTMUSEUM")
            .default_value("false")
            .editable(),
        Item::system(WITH_CLAIR, group::BASIC, Bool)
            .env("WITH_CLAIR")
            .default_value("false")
            .editable(),
        Item::system(WITH_NOTARY, group::BASIC, Bool)
            .env("WITH_NOTARY")
            .default_value("false")
            .editable(),
        Item::user("robot_token_duration", group::BASIC, Int)
            .env("ROBOT_TOKEN_DURATION")
            .default_value("43200")
            .editable(),
        // clair
        Item::system(CLAIR_DB, group::CLAIR, String)
            .env("CLAIR_DB")
            .default_value("postgres"),
        Item::system(CLAIR_DB_HOST, group::CLAIR, String)
            .env("CLAIR_DB_HOST")
            .default_value("postgresql"),
        Item::system(CLAIR_DB_PASSWORD, group::CLAIR, Password)
            .env("CLAIR_DB_PASSWORD")
            .default_value("root123"),
        Item::system(CLAIR_DB_PORT, group::CLAIR, Port)
            .env("CLAIR_DB_PORT")
            .default_value("5432"),
        Item::system(CLAIR_DB_SSLMODE, group::CLAIR, String)
            .env("CLAIR_DB_SSLMODE")
            .default_value("disable"),
        Item::system(CLAIR_DB_USERNAME, group::CLAIR, String)
            .env("CLAIR_DB_USERNAME")
            .default_value("postgres"),
        Item::system("clair_url", group::CLAIR, String)
            .env("CLAIR_URL")
            .default_value("http://clair:6060"),
        // email
        Item::user(EMAIL_FROM, group::EMAIL, String)
            .env("EMAIL_FROM")
            .default_value("admin <sample_admin@mydomain.com>"),
        Item::user(EMAIL_HOST, group::EMAIL, String)
            .env("EMAIL_HOST")
            .default_value("smtp.mydomain.com"),
        Item::user(EMAIL_IDENTITY, group::EMAIL, String).env("EMAIL_IDENTITY"),
        Item::user(EMAIL_INSECURE, group::EMAIL, Bool)
            .env("EMAIL_INSECURE")
            .default_value("false"),
        Item::user(EMAIL_PASSWORD, group::EMAIL, Password).env("EMAIL_PWD"),
        Item::user(EMAIL_PORT, group::EMAIL, Port)
            .env("EMAIL_PORT")
            .default_value("25"),
        Item::user(EMAIL_SSL, group::EMAIL, Bool)
            .env("EMAIL_SSL")
            .default_value("false"),
        Item::user(EMAIL_USERNAME, group::EMAIL, String)
            .env("EMAIL_USR")
            .default_value("sample_admin@mydomain.com"),
        // ldap
        Item::user(LDAP_BASE_DN, group::LDAP_BASIC, NonEmptyString).env("LDAP_BASE_DN"),
        Item::user(LDAP_FILTER, group::LDAP_BASIC, String).env("LDAP_FILTER"),
        Item::user(LDAP_SCOPE, group::LDAP_BASIC, LdapScope)
            .env("LDAP_SCOPE")
            .default_value("2"),
        Item::user(LDAP_SEARCH_DN, group::LDAP_BASIC, String).env("LDAP_SEARCH_DN"),
        Item::user(LDAP_SEARCH_PASSWORD, group::LDAP_BASIC, Password).env("LDAP_SEARCH_PWD"),
        Item::user(LDAP_TIMEOUT, group::LDAP_BASIC, Int)
            .env("LDAP_TIMEOUT")
            .default_value("5"),
        Item::user(LDAP_UID, group::LDAP_BASIC, NonEmptyString)
            .env("LDAP_UID")
            .default_value("cn"),
        Item::user(LDAP_URL, group::LDAP_BASIC, NonEmptyString).env("LDAP_URL"),
        Item::user(LDAP_VERIFY_CERT, group::LDAP_BASIC, Bool)
            .env("LDAP_VERIFY_CERT")
            .default_value("true"),
        Item::user(LDAP_GROUP_MEMBERSHIP_ATTRIBUTE, group::LDAP_BASIC, String)
            .env("LDAP_GROUP_MEMBERSHIP_ATTRIBUTE")
            .default_value("memberof")
            .editable(),
        Item::user(LDAP_GROUP_BASE_DN, group::LDAP_GROUP, String).env("LDAP_GROUP_BASE_DN"),
        Item::user(LDAP_GROUP_ADMIN_DN, group::LDAP_GROUP, String).env("LDAP_GROUP_ADMIN_DN"),
        Item::user(LDAP_GROUP_ATTRIBUTE_NAME, group::LDAP_GROUP, String).env("LDAP_GROUP_GID"),
        Item::user(LDAP_GROUP_SEARCH_FILTER, group::LDAP_GROUP, String).env("LDAP_GROUP_FILTER"),
        Item::user(LDAP_GROUP_SEARCH_SCOPE, group::LDAP_GROUP, LdapScope)
            .env("LDAP_GROUP_SCOPE")
            .default_value("2"),
        // database
        Item::system(POSTGRESQL_DATABASE, group::DATABASE, String)
            .env("POSTGRESQL_DATABASE")
            .default_value("registry"),
        Item::system(POSTGRESQL_HOST, group::DATABASE, String)
            .env("POSTGRESQL_HOST")
            .default_value("postgresql"),
        Item::system(POSTGRESQL_PASSWORD, group::DATABASE, Password)
            .env("POSTGRESQL_PASSWORD")
            .default_value("root123"),
        Item::system(POSTGRESQL_PORT, group::DATABASE, Port)
            .env("POSTGRESQL_PORT")
            .default_value("5432"),
        Item::system(POSTGRESQL_SSLMODE, group::DATABASE, String)
            .env("POSTGRESQL_SSLMODE")
            .default_value("disable"),
        Item::system(POSTGRESQL_USERNAME, group::DATABASE, String)
            .env("POSTGRESQL_USERNAME")
            .default_value("postgres"),
        // uaa
        Item::user(UAA_CLIENT_ID, group::UAA, String).env("UAA_CLIENTID"),
        Item::user(UAA_CLIENT_SECRET, group::UAA, String).env("UAA_CLIENTSECRET"),
        Item::user(UAA_ENDPOINT, group::UAA, String).env("UAA_ENDPOINT"),
        Item::user(UAA_VERIFY_CERT, group::UAA, Bool)
            .env("UAA_VERIFY_CERT")
            .default_value("false"),
        // http auth proxy
        Item::user(HTTP_AUTHPROXY_ENDPOINT, group::HTTP_AUTH, String)
            .env("HTTP_AUTHPROXY_ENDPOINT"),
        Item::user(HTTP_AUTHPROXY_TOKENREVIEW_ENDPOINT, group::HTTP_AUTH, String)
            .env("HTTP_AUTHPROXY_TOKENREVIEW_ENDPOINT"),
        Item::user(HTTP_AUTHPROXY_VERIFY_CERT, group::HTTP_AUTH, Bool)
            .env("HTTP_AUTHPROXY_VERIFY_CERT")
            .default_value("true"),
        Item::user(HTTP_AUTHPROXY_ALWAYS_ONBOARD, group::HTTP_AUTH, Bool)
            .env("HTTP_AUTHPROXY_ALWAYS_ONBOARD")
            .default_value("false"),
        // oidc
        Item::user(OIDC_NAME, group::OIDC, String).env("OIDC_NAME"),
        Item::user(OIDC_ENDPOINT, group::OIDC, String).env("OIDC_ENDPOINT"),
        Item::user(OIDC_CLIENT_ID, group::OIDC, String).env("OIDC_CLIENT_ID"),
        Item::user(OIDC_CLIENT_SECRET, group::OIDC, Password).env("OIDC_CLIENT_SECRET"),
        Item::user(OIDC_SCOPE, group::OIDC, String).env("OIDC_SCOPE"),
        Item::user(OIDC_VERIFY_CERT, group::OIDC, Bool)
            .env("OIDC_VERIFY_CERT")
            .default_value("true"),
        // quota
        Item::user(STORAGE_PER_PROJECT, group::QUOTA, Int64)
            .env("STORAGE_PER_PROJECT")
            .default_value("-1")
            .editable(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::MetadataRegistry;
    use crate::types::Scope;

    #[test]
    fn test_defaults_satisfy_declared_types() {
        for item in default_items() {
            if let Some(default) = &item.default_value {
                assert!(
                    item.item_type.validate(default).is_ok(),
                    "default of {} does not validate",
                    item.name
                );
            }
        }
    }

    #[test]
    fn test_item_list_has_unique_names() {
        let registry = MetadataRegistry::new();
        assert!(registry.try_register(default_items()).is_ok());
    }

    #[test]
    fn test_known_items() {
        let registry = MetadataRegistry::with_items(default_items());
        let ldap_url = registry.get(LDAP_URL).unwrap();
        assert_eq!(ldap_url.scope, Scope::User);
        assert_eq!(ldap_url.env_key.as_deref(), Some("LDAP_URL"));
        assert_eq!(ldap_url.item_type, ItemType::NonEmptyString);

        let cache = registry.get(CFG_CACHE_INTERVAL_SECONDS).unwrap();
        assert_eq!(cache.scope, Scope::System);
        assert_eq!(cache.default_value.as_deref(), Some("0"));

        assert!(registry.password_keys().contains(EMAIL_PASSWORD));
        assert!(registry.get("scan_all_policy").unwrap().default_value.is_none());
    }
}
