use crate::{
    constants::{DB_NAME, MONGODB_URI, PROJECTS_COL_NAME, USERS_COL_NAME, WORKSPACES_COL_NAME},
    models::{project_model::Project, user_model::User, workspace_model::Workspace},
};
use mongodb::{
    Client, Collection, IndexModel,
    bson::doc,
    error::Error as MongoError,
    options::{ClientOptions, IndexOptions},
};

pub async fn connect_to_database() -> Result<Client, MongoError> {
    let client_uri = (*MONGODB_URI).as_str();

    let client_options = ClientOptions::parse(client_uri).await?;
    Client::with_options(client_options)
}

pub async fn get_collection<T>(
    client: &Client,
    collection_name: &str,
) -> Result<Collection<T>, MongoError>
where
    T: serde::de::DeserializeOwned + serde::Serialize + Unpin + Send + Sync,
{
    Ok(client.database(&DB_NAME).collection::<T>(collection_name))
}

fn unique_index_model(keys: mongodb::bson::Document) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build()
}

/// Unique index that only covers documents where the field resolves to a
/// string. Required for array paths like `invites.token`: a plain unique
/// index would register one null entry per workspace with no invites and
/// reject every workspace insert after the first.
fn partial_unique_index_model(field: &str) -> IndexModel {
    IndexModel::builder()
        .keys(doc! { field: 1 })
        .options(
            IndexOptions::builder()
                .unique(true)
                .partial_filter_expression(doc! { field: { "$exists": true, "$type": "string" } })
                .build(),
        )
        .build()
}

async fn create_unique_index<T>(
    collection: &Collection<T>,
    keys: mongodb::bson::Document,
) -> Result<(), MongoError>
where
    T: serde::de::DeserializeOwned + serde::Serialize + Unpin + Send + Sync,
{
    collection.create_index(unique_index_model(keys)).await?;
    Ok(())
}

async fn create_partial_unique_index<T>(
    collection: &Collection<T>,
    field: &str,
) -> Result<(), MongoError>
where
    T: serde::de::DeserializeOwned + serde::Serialize + Unpin + Send + Sync,
{
    collection
        .create_index(partial_unique_index_model(field))
        .await?;
    Ok(())
}

/// Uniqueness the domain relies on, enforced at the storage layer so
/// check-then-act pre-checks in the services stay best-effort only.
pub async fn create_unique_indexes(client: &Client) -> Result<(), MongoError> {
    let workspaces = get_collection::<Workspace>(client, &WORKSPACES_COL_NAME).await?;
    create_unique_index(&workspaces, doc! { "slug": 1 }).await?;
    create_partial_unique_index(&workspaces, "invites.token").await?;

    let projects = get_collection::<Project>(client, &PROJECTS_COL_NAME).await?;
    create_unique_index(&projects, doc! { "workspace_id": 1, "slug": 1 }).await?;

    let users = get_collection::<User>(client, &USERS_COL_NAME).await?;
    create_unique_index(&users, doc! { "email": 1 }).await?;
    create_unique_index(&users, doc! { "external_identity_id": 1 }).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invite_token_index_only_covers_string_entries() {
        // Workspaces start with an empty invites array; without the partial
        // filter every such document would index as one null entry and the
        // unique constraint would reject the second workspace insert.
        let model = partial_unique_index_model("invites.token");

        let options = model.options.expect("index options are set");
        assert_eq!(options.unique, Some(true));
        let filter = options
            .partial_filter_expression
            .expect("partial filter is set");
        let field = filter.get_document("invites.token").unwrap();
        assert_eq!(field.get_bool("$exists").unwrap(), true);
        assert_eq!(field.get_str("$type").unwrap(), "string");
    }

    #[test]
    fn scalar_unique_indexes_have_no_partial_filter() {
        let model = unique_index_model(doc! { "slug": 1 });
        let options = model.options.expect("index options are set");
        assert_eq!(options.unique, Some(true));
        assert!(options.partial_filter_expression.is_none());
    }
}
