//! Per-user virtual file tree.
//!
//! Nodes form a parent-pointer tree per owner. Sibling names are unique and a
//! folder can never end up below itself; both are checked here before writing.
use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use crate::api::{error, success::Download};
use crate::constants::DRIVE_SEARCH_LIMIT;
use crate::modules::drive::{
    model::{clean_name, NewDriveItem},
    repository::DriveRepository,
    schema::{DriveItemEntity, DriveItemKind},
};
use crate::modules::file::{schema::FileUsage, service::FileService};
use crate::utils::UploadedFile;

#[derive(Clone)]
pub struct DriveService {
    repo: Arc<dyn DriveRepository + Send + Sync>,
    files: FileService,
}

impl DriveService {
    pub fn with_dependencies(
        repo: Arc<dyn DriveRepository + Send + Sync>,
        files: FileService,
    ) -> Self {
        tracing::info!("DriveService initialized with dependencies");
        DriveService { repo, files }
    }

    async fn owned_item(&self, owner: Uuid, id: Uuid) -> Result<DriveItemEntity, error::SystemError> {
        let item = self
            .repo
            .find_by_id(&id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Item not found"))?;

        if item.owner_id != owner {
            return Err(error::SystemError::forbidden("You don't have access to this item"));
        }
        Ok(item)
    }

    /// The destination folder must exist, be a folder, and belong to `owner`.
    async fn check_destination(
        &self,
        owner: Uuid,
        parent_id: Option<Uuid>,
    ) -> Result<(), error::SystemError> {
        let Some(parent_id) = parent_id else {
            return Ok(());
        };
        let parent = self.owned_item(owner, parent_id).await.map_err(|e| match e {
            error::SystemError::NotFound(_) => error::SystemError::not_found("Destination folder not found"),
            other => other,
        })?;
        if !parent.is_folder() {
            return Err(error::SystemError::bad_request("Destination is not a folder"));
        }
        Ok(())
    }

    async fn ensure_name_free(
        &self,
        owner: Uuid,
        parent_id: Option<Uuid>,
        name: &str,
        except: Option<Uuid>,
    ) -> Result<(), error::SystemError> {
        match self.repo.find_sibling(&owner, parent_id, name).await? {
            Some(existing) if Some(existing.id) != except => {
                Err(error::SystemError::duplicate_name(name))
            }
            _ => Ok(()),
        }
    }

    /// Walks from `target` up to the root; meeting `item_id` on the way is a cycle.
    async fn ensure_not_below_itself(
        &self,
        item_id: Uuid,
        target: Option<Uuid>,
    ) -> Result<(), error::SystemError> {
        let mut cursor = target;
        let mut seen = HashSet::new();
        while let Some(id) = cursor {
            if id == item_id {
                return Err(error::SystemError::Cycle);
            }
            if !seen.insert(id) {
                tracing::warn!("Drive parent chain loops at {}", id);
                break;
            }
            cursor = self.repo.find_by_id(&id).await?.and_then(|node| node.parent_id);
        }
        Ok(())
    }

    pub async fn list(
        &self,
        owner: Uuid,
        parent_id: Option<Uuid>,
    ) -> Result<Vec<DriveItemEntity>, error::SystemError> {
        self.check_destination(owner, parent_id).await?;
        let mut items = self.repo.list_children(&owner, parent_id).await?;
        items.sort_by(|a, b| {
            (!a.is_folder(), a.name.to_lowercase()).cmp(&(!b.is_folder(), b.name.to_lowercase()))
        });
        Ok(items)
    }

    pub async fn get(&self, owner: Uuid, id: Uuid) -> Result<DriveItemEntity, error::SystemError> {
        self.owned_item(owner, id).await
    }

    /// Breadcrumb from the root level down to `id` itself.
    pub async fn path(&self, owner: Uuid, id: Uuid) -> Result<Vec<DriveItemEntity>, error::SystemError> {
        let mut item = self.owned_item(owner, id).await?;
        let mut seen = HashSet::from([item.id]);
        let mut path = Vec::new();

        while let Some(parent_id) = item.parent_id {
            let parent = self.owned_item(owner, parent_id).await?;
            path.push(std::mem::replace(&mut item, parent));
            if !seen.insert(item.id) {
                break;
            }
        }
        path.push(item);
        path.reverse();
        Ok(path)
    }

    pub async fn create_folder(
        &self,
        owner: Uuid,
        name: &str,
        parent_id: Option<Uuid>,
    ) -> Result<DriveItemEntity, error::SystemError> {
        let name = clean_name(name)?;
        self.check_destination(owner, parent_id).await?;
        self.ensure_name_free(owner, parent_id, &name, None).await?;

        let folder = self
            .repo
            .create(&NewDriveItem {
                owner_id: owner,
                parent_id,
                name,
                kind: DriveItemKind::Folder,
                file_id: None,
            })
            .await?;
        tracing::info!("Folder {} created by {}", folder.id, owner);
        Ok(folder)
    }

    /// Every name is checked before the first blob is written.
    pub async fn upload(
        &self,
        owner: Uuid,
        parent_id: Option<Uuid>,
        uploads: Vec<UploadedFile>,
    ) -> Result<Vec<DriveItemEntity>, error::SystemError> {
        if uploads.is_empty() {
            return Err(error::SystemError::bad_request("No file found in request"));
        }
        self.check_destination(owner, parent_id).await?;

        let mut names = HashSet::new();
        let mut prepared = Vec::with_capacity(uploads.len());
        for upload in uploads {
            let name = clean_name(&upload.filename)?;
            if !names.insert(name.clone()) {
                return Err(error::SystemError::duplicate_name(name));
            }
            self.ensure_name_free(owner, parent_id, &name, None).await?;
            self.files.validate(&upload, FileUsage::Personal)?;
            prepared.push((name, upload));
        }

        let mut created = Vec::with_capacity(prepared.len());
        for (name, upload) in prepared {
            let file = self.files.store(upload, owner, FileUsage::Personal).await?;
            let item = self
                .repo
                .create(&NewDriveItem {
                    owner_id: owner,
                    parent_id,
                    name,
                    kind: DriveItemKind::File,
                    file_id: Some(file.id),
                })
                .await;

            match item {
                Ok(item) => created.push(item),
                Err(e) => {
                    self.files.remove(&file.id).await?;
                    return Err(e);
                }
            }
        }
        tracing::info!("{} file(s) uploaded by {}", created.len(), owner);
        Ok(created)
    }

    pub async fn rename(
        &self,
        owner: Uuid,
        id: Uuid,
        name: &str,
    ) -> Result<DriveItemEntity, error::SystemError> {
        let item = self.owned_item(owner, id).await?;
        let name = clean_name(name)?;
        if name == item.name {
            return Ok(item);
        }
        self.ensure_name_free(owner, item.parent_id, &name, Some(item.id)).await?;
        self.repo.rename(&id, &name).await
    }

    pub async fn move_item(
        &self,
        owner: Uuid,
        id: Uuid,
        parent_id: Option<Uuid>,
    ) -> Result<DriveItemEntity, error::SystemError> {
        let item = self.owned_item(owner, id).await?;
        self.ensure_not_below_itself(item.id, parent_id).await?;
        if item.parent_id == parent_id {
            return Ok(item);
        }
        self.check_destination(owner, parent_id).await?;
        self.ensure_name_free(owner, parent_id, &item.name, Some(item.id)).await?;

        let moved = self.repo.set_parent(&id, parent_id).await?;
        tracing::info!("Item {} moved to {:?}", id, parent_id);
        Ok(moved)
    }

    async fn clone_node(
        &self,
        owner: Uuid,
        source: &DriveItemEntity,
        parent_id: Option<Uuid>,
    ) -> Result<DriveItemEntity, error::SystemError> {
        let file_id = match source.file_id {
            Some(file_id) => {
                let file = self.files.get(&file_id).await?;
                Some(self.files.duplicate(&file, owner).await?.id)
            }
            None => None,
        };

        self.repo
            .create(&NewDriveItem {
                owner_id: owner,
                parent_id,
                name: source.name.clone(),
                kind: source.kind,
                file_id,
            })
            .await
    }

    /// Deep copy. Every copied file gets its own blob.
    pub async fn copy(
        &self,
        owner: Uuid,
        id: Uuid,
        parent_id: Option<Uuid>,
    ) -> Result<DriveItemEntity, error::SystemError> {
        let source = self.owned_item(owner, id).await?;
        self.ensure_not_below_itself(source.id, parent_id).await?;
        self.check_destination(owner, parent_id).await?;
        self.ensure_name_free(owner, parent_id, &source.name, None).await?;

        let root = self.clone_node(owner, &source, parent_id).await?;

        let mut pending = vec![(source.id, root.id)];
        while let Some((source_folder, copy_folder)) = pending.pop() {
            for child in self.repo.list_children(&owner, Some(source_folder)).await? {
                let copied = self.clone_node(owner, &child, Some(copy_folder)).await?;
                if child.is_folder() {
                    pending.push((child.id, copied.id));
                }
            }
        }
        tracing::info!("Item {} copied to {} by {}", id, root.id, owner);
        Ok(root)
    }

    /// Recursive delete, children before parents.
    pub async fn delete(&self, owner: Uuid, id: Uuid) -> Result<(), error::SystemError> {
        let root = self.owned_item(owner, id).await?;

        let mut order = Vec::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if node.is_folder() {
                stack.extend(self.repo.list_children(&owner, Some(node.id)).await?);
            }
            order.push(node);
        }

        for node in order.into_iter().rev() {
            self.repo.delete(&node.id).await?;
            if let Some(file_id) = node.file_id {
                self.files.remove(&file_id).await?;
            }
        }
        tracing::info!("Item {} deleted by {}", id, owner);
        Ok(())
    }

    pub async fn search(
        &self,
        owner: Uuid,
        query: &str,
    ) -> Result<Vec<DriveItemEntity>, error::SystemError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        self.repo.search(&owner, query, DRIVE_SEARCH_LIMIT).await
    }

    pub async fn download(&self, owner: Uuid, id: Uuid) -> Result<Download, error::SystemError> {
        let item = self.owned_item(owner, id).await?;
        let file_id = item
            .file_id
            .ok_or_else(|| error::SystemError::bad_request("Folders cannot be downloaded"))?;
        self.files.download(&file_id, Some(item.name)).await
    }
}
