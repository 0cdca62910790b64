//! Tenant, user and audit listings

use super::report::column_width;
use crate::audit::AuditEntry;
use crate::models::{Tenant, User};

pub fn format_tenant_list(tenants: &[Tenant]) -> String {
    if tenants.is_empty() {
        return "No companies registered.\n".to_string();
    }

    let key_width = column_width(tenants.iter().map(|t| t.key.as_str()), 3);
    let mut output = format!("{:<key_width$}  {:<30}  {}\n", "Key", "Company", "Registered");
    for tenant in tenants {
        output.push_str(&format!(
            "{:<key_width$}  {:<30}  {}\n",
            tenant.key.as_str(),
            tenant.display_name,
            tenant.registered_at.format("%Y-%m-%d"),
        ));
    }
    output
}

pub fn format_user_list(users: &[User]) -> String {
    if users.is_empty() {
        return "No users.\n".to_string();
    }

    let name_width = column_width(users.iter().map(|u| u.username.as_str()), 8);
    let mut output = format!("{:<name_width$}  {:<6}  {}\n", "Username", "Role", "Created");
    for user in users {
        output.push_str(&format!(
            "{:<name_width$}  {:<6}  {}\n",
            user.username,
            user.role.to_string(),
            user.created_at.format("%Y-%m-%d"),
        ));
    }
    output
}

pub fn format_audit_entries(entries: &[AuditEntry]) -> String {
    if entries.is_empty() {
        return "No audit entries.\n".to_string();
    }

    let mut output = String::new();
    for entry in entries {
        output.push_str(&entry.format_human_readable());
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TenantRegistry;

    #[test]
    fn test_tenant_list() {
        let mut registry = TenantRegistry::new();
        registry.register("Acme Construções").unwrap();

        let output = format_tenant_list(registry.tenants());
        assert!(output.contains("acme-construções"));
        assert!(output.contains("Acme Construções"));
    }

    #[test]
    fn test_empty_lists() {
        assert_eq!(format_user_list(&[]), "No users.\n");
        assert_eq!(format_audit_entries(&[]), "No audit entries.\n");
    }
}
