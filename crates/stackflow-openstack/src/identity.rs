//! Project and user creators

use async_trait::async_trait;
use stackflow_cloud::{Cloud, CloudError, Project, ResourceCreator, Result, User, ignore_not_found};
use stackflow_core::{Descriptor, ProjectConfig, UserConfig};
use tracing::{debug, info};

pub struct ProjectCreator {
    cloud: Cloud,
    config: ProjectConfig,
    project: Option<Project>,
}

impl ProjectCreator {
    pub fn new(cloud: Cloud, config: ProjectConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            cloud,
            config,
            project: None,
        })
    }
}

#[async_trait]
impl ResourceCreator for ProjectCreator {
    type Config = ProjectConfig;
    type Handle = Project;

    fn config(&self) -> &ProjectConfig {
        &self.config
    }

    async fn initialize(&mut self) -> Result<Option<Project>> {
        debug!("Looking up project: {}", self.config.name);
        self.project = self
            .cloud
            .identity
            .find_project(&self.config.name, &self.config.domain)
            .await?;
        Ok(self.project.clone())
    }

    async fn create(&mut self) -> Result<Project> {
        if let Some(project) = self.initialize().await? {
            return Ok(project);
        }
        info!("Creating project: {}", self.config.name);
        let project = self.cloud.identity.create_project(&self.config).await?;
        self.project = Some(project.clone());

        if !self.config.quotas.is_empty() {
            debug!(quotas = ?self.config.quotas, "Updating project quotas");
            self.cloud
                .identity
                .update_quotas(&project, &self.config.quotas)
                .await?;
        }
        Ok(project)
    }

    async fn clean(&mut self) -> Result<()> {
        let Some(project) = self.project.take() else {
            return Ok(());
        };
        info!("Deleting project: {}", project.name);
        ignore_not_found(self.cloud.identity.delete_project(&project).await)
    }

    fn get(&self) -> Option<&Project> {
        self.project.as_ref()
    }
}

pub struct UserCreator {
    cloud: Cloud,
    config: UserConfig,
    user: Option<User>,
}

impl UserCreator {
    pub fn new(cloud: Cloud, config: UserConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            cloud,
            config,
            user: None,
        })
    }

    async fn project(&self, name: &str) -> Result<Project> {
        self.cloud
            .identity
            .find_project(name, &self.config.domain_name)
            .await?
            .ok_or_else(|| CloudError::not_found(format!("project {}", name)))
    }
}

#[async_trait]
impl ResourceCreator for UserCreator {
    type Config = UserConfig;
    type Handle = User;

    fn config(&self) -> &UserConfig {
        &self.config
    }

    async fn initialize(&mut self) -> Result<Option<User>> {
        debug!("Looking up user: {}", self.config.name);
        self.user = self
            .cloud
            .identity
            .find_user(&self.config.name, &self.config.domain_name)
            .await?;
        Ok(self.user.clone())
    }

    async fn create(&mut self) -> Result<User> {
        if let Some(user) = self.initialize().await? {
            return Ok(user);
        }

        let default_project = match &self.config.project_name {
            Some(name) => Some(self.project(name).await?),
            None => None,
        };
        info!("Creating user: {}", self.config.name);
        let user = self
            .cloud
            .identity
            .create_user(&self.config, default_project.as_ref())
            .await?;
        self.user = Some(user.clone());

        for (role, project_name) in &self.config.roles {
            let project = self.project(project_name).await?;
            info!("Granting role {} on {} to {}", role, project.name, user.name);
            self.cloud.identity.grant_role(&user, role, &project).await?;
        }
        Ok(user)
    }

    async fn clean(&mut self) -> Result<()> {
        let Some(user) = self.user.take() else {
            return Ok(());
        };
        info!("Deleting user: {}", user.name);
        ignore_not_found(self.cloud.identity.delete_user(&user).await)
    }

    fn get(&self) -> Option<&User> {
        self.user.as_ref()
    }
}
