use crate::app::App;
use crate::errors::ClientError;
use crate::models::AccessGrantMap;

pub async fn run(app: &App, profile: &str) -> Result<String, ClientError> {
    let (_, grants) = app.privileges.check_privileges(profile).await?;
    Ok(render(&grants))
}

pub fn render(grants: &AccessGrantMap) -> String {
    if grants.is_empty() {
        return "no project access granted".to_string();
    }
    grants
        .iter()
        .map(|(project, permissions)| {
            let labels: Vec<&str> = permissions.values().map(String::as_str).collect();
            format!("{}: {}", project, labels.join(", "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_one_line_per_project() {
        let grants = AccessGrantMap::from_body(
            br#"{"project_access": {"b": {"1": "create", "0": "read"}, "a": {"0": "read"}}}"#,
        )
        .expect("parse");
        assert_eq!(render(&grants), "a: read\nb: read, create");
    }

    #[test]
    fn renders_empty_grant() {
        assert_eq!(render(&AccessGrantMap::new()), "no project access granted");
    }
}
