mod t001_schema;
mod t002_sql_authorization;
mod t003_single_use;
mod t004_properties;
mod t005_system_properties;
