//! Profile edit form merged over the current profile.

use crate::types::{Gender, UpdateProfileRequest, User};

/// Raw profile edits. Blank fields mean "keep what the profile has".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub nickname: String,
    pub birth_year: String,
    pub gender: Option<Gender>,
    pub address: String,
    /// Storage URL of a newly uploaded profile image.
    pub uploaded_image_url: Option<String>,
    pub remove_image: bool,
}

impl ProfileForm {
    /// Pre-fill from the current profile.
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self {
            nickname: user.nickname.clone(),
            birth_year: user.birth_year.filter(|y| *y != 0).map(|y| y.to_string()).unwrap_or_default(),
            gender: user.gender,
            address: user.address.clone().unwrap_or_default(),
            uploaded_image_url: None,
            remove_image: false,
        }
    }

    /// Build the update body, falling back field by field.
    ///
    /// Nickname, birth year, gender and address fall back to the current
    /// profile; birth year then falls back to `current_year` and gender to
    /// female. The image is dropped when removal was requested, otherwise
    /// the new upload wins over the current image.
    #[must_use]
    pub fn merge(&self, current: Option<&User>, current_year: i32) -> UpdateProfileRequest {
        let nickname = non_blank(&self.nickname)
            .or_else(|| current.map(|u| u.nickname.clone()))
            .unwrap_or_default();
        let birth_year = self
            .birth_year
            .trim()
            .parse::<i32>()
            .ok()
            .filter(|y| *y != 0)
            .or_else(|| current.and_then(|u| u.birth_year).filter(|y| *y != 0))
            .unwrap_or(current_year);
        let gender = self
            .gender
            .or_else(|| current.and_then(|u| u.gender))
            .unwrap_or(Gender::Female);
        let address = non_blank(&self.address)
            .or_else(|| current.and_then(|u| u.address.clone()))
            .unwrap_or_default();
        let profile_image_url = if self.remove_image {
            None
        } else {
            self.uploaded_image_url
                .clone()
                .or_else(|| current.and_then(|u| u.profile_image_url.clone()))
        };

        UpdateProfileRequest { nickname, birth_year, gender, address, profile_image_url }
    }
}

fn non_blank(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

#[cfg(test)]
#[path = "profile_test.rs"]
mod tests;
