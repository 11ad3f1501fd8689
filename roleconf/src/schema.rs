use serde::Serialize;

pub const RESOURCE_NAME: &str = "postgresql_alter_role";

pub const ALTER_ROLE: &str = "alter_role";
pub const ALTER_PARAMETER_KEY: &str = "alter_parameter_key";
pub const ALTER_PARAMETER_VALUE: &str = "alter_parameter_value";
pub const ID: &str = "id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSchema {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: FieldType,
    pub required: bool,
    pub computed: bool,
    /// Changing the field destroys and recreates the resource.
    pub force_new: bool,
    pub description: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceSchema {
    pub name: &'static str,
    pub fields: Vec<FieldSchema>,
}

impl ResourceSchema {
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }
}

fn input(name: &'static str, description: &'static str) -> FieldSchema {
    FieldSchema {
        name,
        kind: FieldType::String,
        required: true,
        computed: false,
        force_new: true,
        description,
    }
}

/// Schema of `postgresql_alter_role`: three immutable inputs and the
/// derived identity.
pub fn alter_role() -> ResourceSchema {
    ResourceSchema {
        name: RESOURCE_NAME,
        fields: vec![
            input(ALTER_ROLE, "The name of the role to alter the attributes of"),
            input(
                ALTER_PARAMETER_KEY,
                "The name of the parameter to alter on the role",
            ),
            input(
                ALTER_PARAMETER_VALUE,
                "The value of the parameter which is being set",
            ),
            FieldSchema {
                name: ID,
                kind: FieldType::String,
                required: false,
                computed: true,
                force_new: false,
                description: "Identity of the binding, `<role>_<key>_<value>`",
            },
        ],
    }
}
