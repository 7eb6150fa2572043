use anyhow::{bail, Context, Result};
use clap::Subcommand;
use fmdata_rs::{
    Client, ContainerUpload, FieldType, FindCriteria, FindCriteriaField, FindRequest, RecordField,
    ScriptParameters, SortCriteria,
};
use std::path::PathBuf;

/// Invalid field, query or sort argument
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ArgError {
    #[error("expected name=value or name:=number, got {0:?}")]
    MissingSeparator(String),

    #[error("empty field name in {0:?}")]
    EmptyName(String),

    #[error("unknown sort order {0:?}, expected asc or desc")]
    SortOrder(String),
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and print the session response
    Login,

    /// Create a record
    Create {
        /// Layout name (defaults to the config file layout)
        #[arg(long)]
        layout: Option<String>,

        /// Field values: name=text or name:=number
        #[arg(required = true)]
        fields: Vec<String>,

        /// Script to run after the request
        #[arg(long)]
        script: Option<String>,

        #[arg(long, requires = "script")]
        script_param: Option<String>,
    },

    /// Edit a record
    Edit {
        #[arg(long)]
        layout: Option<String>,

        record_id: String,

        /// Field values: name=text or name:=number
        #[arg(required = true)]
        fields: Vec<String>,
    },

    /// Delete a record
    Delete {
        #[arg(long)]
        layout: Option<String>,

        record_id: String,
    },

    /// Run a find request
    Find {
        #[arg(long)]
        layout: Option<String>,

        /// One criteria group: name=value[;name=value...], prefix with ! to omit
        #[arg(short, long = "query", required = true)]
        queries: Vec<String>,

        /// Sort field: name or name:desc
        #[arg(long)]
        sort: Vec<String>,

        #[arg(long, default_value_t = 100)]
        limit: u32,

        #[arg(long, default_value_t = 0)]
        offset: u32,
    },

    /// Upload a file into a container field
    Upload {
        #[arg(long)]
        layout: Option<String>,

        record_id: String,

        /// Container field name
        field: String,

        file: PathBuf,

        #[arg(long, default_value = "application/octet-stream")]
        content_type: String,

        #[arg(long, default_value_t = 1)]
        repetition: u32,
    },
}

/// Parse `name=text` or `name:=number`
pub fn parse_field(arg: &str) -> std::result::Result<RecordField, ArgError> {
    let (name, value, field_type) = match (arg.find(":="), arg.find('=')) {
        (Some(i), Some(j)) if i < j => (&arg[..i], &arg[i + 2..], FieldType::Number),
        (_, Some(j)) => (&arg[..j], &arg[j + 1..], FieldType::Text),
        _ => return Err(ArgError::MissingSeparator(arg.to_string())),
    };
    if name.is_empty() {
        return Err(ArgError::EmptyName(arg.to_string()));
    }
    Ok(RecordField::new(name, value, field_type))
}

/// Parse one criteria group: `a=1;b=2`, or `!a=1` to omit matches
pub fn parse_group(arg: &str) -> std::result::Result<FindCriteria, ArgError> {
    let (omit, body) = match arg.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, arg),
    };
    let mut fields = Vec::new();
    for part in body.split(';').filter(|p| !p.is_empty()) {
        let (name, value) = part
            .split_once('=')
            .ok_or_else(|| ArgError::MissingSeparator(part.to_string()))?;
        if name.is_empty() {
            return Err(ArgError::EmptyName(part.to_string()));
        }
        fields.push(FindCriteriaField::new(name, value));
    }
    Ok(FindCriteria { fields, omit })
}

/// Parse sort arguments: `name`, `name:asc` or `name:desc`
pub fn parse_sort(args: &[String]) -> std::result::Result<SortCriteria, ArgError> {
    let mut sort = SortCriteria::default();
    for arg in args {
        sort = match arg.rsplit_once(':') {
            None => sort.ascend(arg.as_str()),
            Some((name, "asc")) => sort.ascend(name),
            Some((name, "desc")) => sort.descend(name),
            Some((_, other)) => return Err(ArgError::SortOrder(other.to_string())),
        };
    }
    Ok(sort)
}

fn resolve_layout(arg: Option<String>, default: &str) -> Result<String> {
    match arg {
        Some(layout) if !layout.is_empty() => Ok(layout),
        _ if !default.is_empty() => Ok(default.to_string()),
        _ => bail!("no layout given and none configured"),
    }
}

fn parse_fields(args: &[String]) -> Result<Vec<RecordField>> {
    Ok(args
        .iter()
        .map(|a| parse_field(a))
        .collect::<std::result::Result<Vec<_>, _>>()?)
}

/// Log in, execute one command, log out, and return the command's
/// response body. Logout is attempted even when the command fails.
pub async fn run_session(
    client: &mut Client,
    database: &str,
    default_layout: &str,
    command: Command,
) -> Result<String> {
    let login_body = client.log_in().await?;
    let result = execute(client, database, default_layout, command, login_body).await;
    if let Err(e) = client.log_out().await {
        tracing::warn!("Failed to log out: {}", e);
    }
    result
}

async fn execute(
    client: &Client,
    database: &str,
    default_layout: &str,
    command: Command,
    login_body: String,
) -> Result<String> {
    let body = match command {
        Command::Login => login_body,
        Command::Create {
            layout,
            fields,
            script,
            script_param,
        } => {
            let layout = resolve_layout(layout, default_layout)?;
            let fields = parse_fields(&fields)?;
            let scripts = script
                .map(|name| ScriptParameters::script(name, script_param.unwrap_or_default()));
            client
                .create_record(database, &layout, &fields, scripts.as_ref())
                .await?
        }
        Command::Edit {
            layout,
            record_id,
            fields,
        } => {
            let layout = resolve_layout(layout, default_layout)?;
            let fields = parse_fields(&fields)?;
            client
                .edit_record(database, &layout, &record_id, &fields, None)
                .await?
        }
        Command::Delete { layout, record_id } => {
            let layout = resolve_layout(layout, default_layout)?;
            client
                .delete_record(database, &layout, &record_id, None)
                .await?
        }
        Command::Find {
            layout,
            queries,
            sort,
            limit,
            offset,
        } => {
            let layout = resolve_layout(layout, default_layout)?;
            let groups = queries
                .iter()
                .map(|q| parse_group(q))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            let mut request = FindRequest::new(groups).limit(limit).offset(offset);
            let sort = parse_sort(&sort)?;
            if !sort.is_empty() {
                request = request.sort(sort);
            }
            client.perform_find(database, &layout, &request).await?
        }
        Command::Upload {
            layout,
            record_id,
            field,
            file,
            content_type,
            repetition,
        } => {
            let layout = resolve_layout(layout, default_layout)?;
            let content = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let filename = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "upload".to_string());
            let upload =
                ContainerUpload::new(field, filename, content_type, content).repetition(repetition);
            client
                .upload_container_data(database, &layout, &record_id, &upload)
                .await?
        }
    };
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fmdata_rs::SortOrder;

    #[test]
    fn test_parse_text_and_number_fields() {
        assert_eq!(
            parse_field("label=hello=world").unwrap(),
            RecordField::text("label", "hello=world")
        );
        let number = parse_field("count:=42").unwrap();
        assert_eq!(number.field_type, FieldType::Number);
        assert_eq!(number.value, "42");
        // a ":=" inside the value does not make the field numeric
        assert_eq!(
            parse_field("note=a:=b").unwrap(),
            RecordField::text("note", "a:=b")
        );
    }

    #[test]
    fn test_parse_field_errors() {
        assert_eq!(
            parse_field("novalue"),
            Err(ArgError::MissingSeparator("novalue".to_string()))
        );
        assert_eq!(parse_field("=x"), Err(ArgError::EmptyName("=x".to_string())));
    }

    #[test]
    fn test_parse_groups() {
        let group = parse_group("city=Zurich;age=>30").unwrap();
        assert!(!group.omit);
        assert_eq!(group.fields.len(), 2);
        assert_eq!(group.fields[1], FindCriteriaField::new("age", ">30"));

        let omit = parse_group("!city=Bern").unwrap();
        assert!(omit.omit);
        assert!(parse_group("city").is_err());
    }

    #[test]
    fn test_parse_sort() {
        let sort = parse_sort(&["name".to_string(), "created:desc".to_string()]).unwrap();
        assert_eq!(sort.fields[0].sort_order, SortOrder::Ascend);
        assert_eq!(sort.fields[1].field_name, "created");
        assert_eq!(sort.fields[1].sort_order, SortOrder::Descend);
        assert!(parse_sort(&["x:up".to_string()]).is_err());
    }

    #[test]
    fn test_resolve_layout() {
        assert_eq!(resolve_layout(Some("A".into()), "B").unwrap(), "A");
        assert_eq!(resolve_layout(None, "B").unwrap(), "B");
        assert!(resolve_layout(None, "").is_err());
    }
}
