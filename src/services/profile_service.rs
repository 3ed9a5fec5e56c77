use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::profile::{
    Education, Experience, Profile, ProfileWithOwner, SocialLinks,
};
use crate::database::models::user::{User, UserSummary};

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("There is no profile for this user")]
    NoProfileForUser,

    #[error("Profile not found")]
    NotFound,

    #[error("Experience not found")]
    ExperienceNotFound,

    #[error("Education not found")]
    EducationNotFound,

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<sqlx::Error> for ProfileError {
    fn from(err: sqlx::Error) -> Self {
        ProfileError::Database(DatabaseError::Sqlx(err))
    }
}

/// Partial-update document for the create-or-update path. Only fields
/// present in the request are applied; the social record is rebuilt from
/// the request wholesale on every write.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileFields {
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
    pub bio: Option<String>,
    #[serde(rename = "githubusername")]
    pub github_username: Option<String>,
    /// Comma-delimited on the wire, split and trimmed into an ordered list
    pub skills: Option<String>,
    pub youtube: Option<String>,
    pub twitter: Option<String>,
    pub facebook: Option<String>,
    pub linkedin: Option<String>,
    pub instagram: Option<String>,
}

impl ProfileFields {
    fn social_links(&self) -> SocialLinks {
        SocialLinks {
            youtube: self.youtube.clone(),
            twitter: self.twitter.clone(),
            facebook: self.facebook.clone(),
            linkedin: self.linkedin.clone(),
            instagram: self.instagram.clone(),
        }
    }
}

/// A validated experience entry, ready to prepend.
#[derive(Debug)]
pub struct NewExperience {
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub from: NaiveDate,
    pub to: Option<NaiveDate>,
    pub current: bool,
    pub description: Option<String>,
}

#[derive(Debug)]
pub struct NewEducation {
    pub school: String,
    pub degree: String,
    pub field_of_study: String,
    pub from: NaiveDate,
    pub to: Option<NaiveDate>,
    pub current: bool,
    pub description: Option<String>,
}

pub struct ProfileService {
    pool: PgPool,
}

impl ProfileService {
    pub async fn new() -> Result<Self, ProfileError> {
        Ok(Self {
            pool: DatabaseManager::pool().await?,
        })
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Profile>, ProfileError> {
        Ok(
            sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    pub async fn get_mine(&self, user_id: Uuid) -> Result<ProfileWithOwner, ProfileError> {
        let profile = self
            .find_by_user(user_id)
            .await?
            .ok_or(ProfileError::NoProfileForUser)?;

        self.with_owner(profile).await
    }

    pub async fn get_all(&self) -> Result<Vec<ProfileWithOwner>, ProfileError> {
        let profiles =
            sqlx::query_as::<_, Profile>("SELECT * FROM profiles ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;

        let ids: Vec<Uuid> = profiles.iter().map(|p| p.user_id).collect();
        let users = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        let by_id: HashMap<Uuid, &User> = users.iter().map(|u| (u.id, u)).collect();

        Ok(profiles
            .into_iter()
            .map(|profile| {
                let user = by_id.get(&profile.user_id).map(|u| UserSummary::from(*u));
                ProfileWithOwner { profile, user }
            })
            .collect())
    }

    /// Look up a profile by its owner's id as given in the URL. A
    /// malformed identifier reads the same as an unknown one.
    pub async fn get_by_user(&self, user_id: &str) -> Result<ProfileWithOwner, ProfileError> {
        let user_id = Uuid::parse_str(user_id).map_err(|_| ProfileError::NotFound)?;

        let profile = self
            .find_by_user(user_id)
            .await?
            .ok_or(ProfileError::NotFound)?;

        self.with_owner(profile).await
    }

    /// Create the caller's profile, or apply a partial update to the
    /// existing one. The branches are mutually exclusive and each one is
    /// terminal.
    pub async fn upsert(
        &self,
        user_id: Uuid,
        fields: ProfileFields,
    ) -> Result<Profile, ProfileError> {
        match self.find_by_user(user_id).await? {
            Some(profile) => self.update(profile, fields).await,
            None => self.create(user_id, fields).await,
        }
    }

    pub async fn add_experience(
        &self,
        user_id: Uuid,
        new: NewExperience,
    ) -> Result<Profile, ProfileError> {
        let mut profile = self
            .find_by_user(user_id)
            .await?
            .ok_or(ProfileError::NoProfileForUser)?;

        let entry = Experience {
            id: Uuid::new_v4(),
            title: new.title,
            company: new.company,
            location: new.location,
            from: new.from,
            to: new.to,
            current: new.current,
            description: new.description,
        };

        profile.experience.0.insert(0, entry);
        self.save(&profile).await?;
        Ok(profile)
    }

    pub async fn remove_experience(
        &self,
        user_id: Uuid,
        exp_id: &str,
    ) -> Result<Profile, ProfileError> {
        let mut profile = self
            .find_by_user(user_id)
            .await?
            .ok_or(ProfileError::NoProfileForUser)?;

        let exp_id = Uuid::parse_str(exp_id).map_err(|_| ProfileError::ExperienceNotFound)?;
        let index = profile
            .experience
            .0
            .iter()
            .position(|entry| entry.id == exp_id)
            .ok_or(ProfileError::ExperienceNotFound)?;

        profile.experience.0.remove(index);
        self.save(&profile).await?;
        Ok(profile)
    }

    pub async fn add_education(
        &self,
        user_id: Uuid,
        new: NewEducation,
    ) -> Result<Profile, ProfileError> {
        let mut profile = self
            .find_by_user(user_id)
            .await?
            .ok_or(ProfileError::NoProfileForUser)?;

        let entry = Education {
            id: Uuid::new_v4(),
            school: new.school,
            degree: new.degree,
            field_of_study: new.field_of_study,
            from: new.from,
            to: new.to,
            current: new.current,
            description: new.description,
        };

        profile.education.0.insert(0, entry);
        self.save(&profile).await?;
        Ok(profile)
    }

    pub async fn remove_education(
        &self,
        user_id: Uuid,
        edu_id: &str,
    ) -> Result<Profile, ProfileError> {
        let mut profile = self
            .find_by_user(user_id)
            .await?
            .ok_or(ProfileError::NoProfileForUser)?;

        let edu_id = Uuid::parse_str(edu_id).map_err(|_| ProfileError::EducationNotFound)?;
        let index = profile
            .education
            .0
            .iter()
            .position(|entry| entry.id == edu_id)
            .ok_or(ProfileError::EducationNotFound)?;

        profile.education.0.remove(index);
        self.save(&profile).await?;
        Ok(profile)
    }

    async fn with_owner(&self, profile: Profile) -> Result<ProfileWithOwner, ProfileError> {
        let owner = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(profile.user_id)
            .fetch_optional(&self.pool)
            .await?;

        let user = owner.as_ref().map(UserSummary::from);
        Ok(ProfileWithOwner { profile, user })
    }

    async fn update(
        &self,
        mut profile: Profile,
        fields: ProfileFields,
    ) -> Result<Profile, ProfileError> {
        apply_fields(&mut profile, fields);
        self.save(&profile).await?;
        Ok(profile)
    }

    async fn create(
        &self,
        user_id: Uuid,
        fields: ProfileFields,
    ) -> Result<Profile, ProfileError> {
        let social = fields.social_links();
        let profile = Profile {
            id: Uuid::new_v4(),
            user_id,
            company: fields.company,
            website: fields.website,
            location: fields.location,
            // Presence is validated at the handler boundary
            status: fields.status.unwrap_or_default(),
            bio: fields.bio,
            github_username: fields.github_username,
            skills: Json(fields.skills.as_deref().map(split_skills).unwrap_or_default()),
            experience: Json(Vec::new()),
            education: Json(Vec::new()),
            social: Json(social),
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO profiles \
             (id, user_id, company, website, location, status, bio, github_username, \
              skills, experience, education, social, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(profile.id)
        .bind(profile.user_id)
        .bind(profile.company.clone())
        .bind(profile.website.clone())
        .bind(profile.location.clone())
        .bind(profile.status.clone())
        .bind(profile.bio.clone())
        .bind(profile.github_username.clone())
        .bind(profile.skills.clone())
        .bind(profile.experience.clone())
        .bind(profile.education.clone())
        .bind(profile.social.clone())
        .bind(profile.created_at)
        .execute(&self.pool)
        .await?;

        Ok(profile)
    }

    /// Write the whole row back, the document-style save every mutation in
    /// this service goes through.
    async fn save(&self, profile: &Profile) -> Result<(), ProfileError> {
        sqlx::query(
            "UPDATE profiles SET company = $2, website = $3, location = $4, status = $5, \
             bio = $6, github_username = $7, skills = $8, experience = $9, education = $10, \
             social = $11 WHERE id = $1",
        )
        .bind(profile.id)
        .bind(profile.company.clone())
        .bind(profile.website.clone())
        .bind(profile.location.clone())
        .bind(profile.status.clone())
        .bind(profile.bio.clone())
        .bind(profile.github_username.clone())
        .bind(profile.skills.clone())
        .bind(profile.experience.clone())
        .bind(profile.education.clone())
        .bind(profile.social.clone())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Merge only the request's present fields into the stored profile.
fn apply_fields(profile: &mut Profile, fields: ProfileFields) {
    let social = fields.social_links();

    if let Some(company) = fields.company {
        profile.company = Some(company);
    }
    if let Some(website) = fields.website {
        profile.website = Some(website);
    }
    if let Some(location) = fields.location {
        profile.location = Some(location);
    }
    if let Some(status) = fields.status {
        profile.status = status;
    }
    if let Some(bio) = fields.bio {
        profile.bio = Some(bio);
    }
    if let Some(github_username) = fields.github_username {
        profile.github_username = Some(github_username);
    }
    if let Some(skills) = fields.skills {
        profile.skills = Json(split_skills(&skills));
    }

    profile.social = Json(social);
}

/// Split a comma-delimited skills string into an ordered, trimmed list.
pub fn split_skills(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|skill| skill.trim().to_string())
        .filter(|skill| !skill.is_empty())
        .collect()
}
