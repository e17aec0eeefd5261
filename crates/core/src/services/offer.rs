//! Offer service (listing CRUD, search and gallery management).

use chrono::Utc;
use findcoloc_common::{AppError, AppResult, IdGenerator};
use sea_orm::Set;
use validator::Validate;

use findcoloc_db::{
    entities::{offer, offer::OfferStatus, offer_image},
    repositories::{OfferImageRepository, OfferRepository, OfferSearchFilter},
};

/// Input for creating an offer.
#[derive(Debug, Validate)]
pub struct CreateOfferInput {
    #[validate(length(min = 1, max = 256))]
    pub title: String,
    #[validate(length(min = 1, max = 10000))]
    pub description: String,
    #[validate(range(min = 1))]
    pub price: i32,
    #[validate(length(min = 1, max = 128))]
    pub city: String,
    #[validate(length(min = 1, max = 512))]
    pub address: String,
    #[validate(length(min = 1, max = 16))]
    pub postal_code: String,
    pub surface_m2: Option<i32>,
    pub rooms: Option<i32>,
    pub furnished: bool,
    pub wifi: bool,
    pub washing_machine: bool,
    pub parking: bool,
    pub smoking_allowed: bool,
    pub pets_allowed: bool,
    pub visitors_allowed: bool,
    pub party_allowed: bool,
    /// When false the offer is saved as a draft instead of being submitted
    /// for moderation.
    pub publish: bool,
}

/// Input for updating an offer. Absent fields are left untouched.
#[derive(Debug, Default, Validate)]
pub struct UpdateOfferInput {
    #[validate(length(min = 1, max = 256))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 10000))]
    pub description: Option<String>,
    #[validate(range(min = 1))]
    pub price: Option<i32>,
    #[validate(length(min = 1, max = 128))]
    pub city: Option<String>,
    #[validate(length(min = 1, max = 512))]
    pub address: Option<String>,
    #[validate(length(min = 1, max = 16))]
    pub postal_code: Option<String>,
    pub surface_m2: Option<i32>,
    pub rooms: Option<i32>,
    pub furnished: Option<bool>,
    pub wifi: Option<bool>,
    pub washing_machine: Option<bool>,
    pub parking: Option<bool>,
    pub smoking_allowed: Option<bool>,
    pub pets_allowed: Option<bool>,
    pub visitors_allowed: Option<bool>,
    pub party_allowed: Option<bool>,
}

/// An offer with its gallery.
#[derive(Debug)]
pub struct OfferDetail {
    pub offer: offer::Model,
    pub images: Vec<offer_image::Model>,
}

/// Offer service for business logic.
#[derive(Clone)]
pub struct OfferService {
    offer_repo: OfferRepository,
    image_repo: OfferImageRepository,
    id_gen: IdGenerator,
}

impl OfferService {
    /// Create a new offer service.
    #[must_use]
    pub const fn new(offer_repo: OfferRepository, image_repo: OfferImageRepository) -> Self {
        Self {
            offer_repo,
            image_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create an offer, as a draft or submitted for moderation.
    pub async fn create(&self, owner_id: &str, input: CreateOfferInput) -> AppResult<offer::Model> {
        input.validate()?;

        let status = if input.publish {
            OfferStatus::Pending
        } else {
            OfferStatus::Draft
        };

        let model = offer::ActiveModel {
            id: Set(self.id_gen.generate()),
            owner_id: Set(owner_id.to_string()),
            title: Set(input.title),
            description: Set(input.description),
            price: Set(input.price),
            city: Set(input.city),
            address: Set(input.address),
            postal_code: Set(input.postal_code),
            surface_m2: Set(input.surface_m2),
            rooms: Set(input.rooms),
            furnished: Set(input.furnished),
            wifi: Set(input.wifi),
            washing_machine: Set(input.washing_machine),
            parking: Set(input.parking),
            smoking_allowed: Set(input.smoking_allowed),
            pets_allowed: Set(input.pets_allowed),
            visitors_allowed: Set(input.visitors_allowed),
            party_allowed: Set(input.party_allowed),
            status: Set(status),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        self.offer_repo.create(model).await
    }

    /// Update one's own offer. Rented offers are frozen until the stay ends.
    pub async fn update(
        &self,
        offer_id: &str,
        owner_id: &str,
        input: UpdateOfferInput,
    ) -> AppResult<offer::Model> {
        input.validate()?;

        let offer = self.authorize_owner(offer_id, owner_id).await?;

        if offer.status == OfferStatus::Rented {
            return Err(AppError::BadRequest(
                "A rented offer cannot be edited".to_string(),
            ));
        }

        let mut model: offer::ActiveModel = offer.into();
        if let Some(title) = input.title {
            model.title = Set(title);
        }
        if let Some(description) = input.description {
            model.description = Set(description);
        }
        if let Some(price) = input.price {
            model.price = Set(price);
        }
        if let Some(city) = input.city {
            model.city = Set(city);
        }
        if let Some(address) = input.address {
            model.address = Set(address);
        }
        if let Some(postal_code) = input.postal_code {
            model.postal_code = Set(postal_code);
        }
        if let Some(surface_m2) = input.surface_m2 {
            model.surface_m2 = Set(Some(surface_m2));
        }
        if let Some(rooms) = input.rooms {
            model.rooms = Set(Some(rooms));
        }
        if let Some(furnished) = input.furnished {
            model.furnished = Set(furnished);
        }
        if let Some(wifi) = input.wifi {
            model.wifi = Set(wifi);
        }
        if let Some(washing_machine) = input.washing_machine {
            model.washing_machine = Set(washing_machine);
        }
        if let Some(parking) = input.parking {
            model.parking = Set(parking);
        }
        if let Some(smoking_allowed) = input.smoking_allowed {
            model.smoking_allowed = Set(smoking_allowed);
        }
        if let Some(pets_allowed) = input.pets_allowed {
            model.pets_allowed = Set(pets_allowed);
        }
        if let Some(visitors_allowed) = input.visitors_allowed {
            model.visitors_allowed = Set(visitors_allowed);
        }
        if let Some(party_allowed) = input.party_allowed {
            model.party_allowed = Set(party_allowed);
        }
        model.updated_at = Set(Some(Utc::now().into()));

        self.offer_repo.update(model).await
    }

    /// Submit a draft for moderation.
    pub async fn submit(&self, offer_id: &str, owner_id: &str) -> AppResult<offer::Model> {
        let offer = self.authorize_owner(offer_id, owner_id).await?;

        if offer.status != OfferStatus::Draft {
            return Err(AppError::BadRequest(
                "Only drafts can be submitted for moderation".to_string(),
            ));
        }

        let mut model: offer::ActiveModel = offer.into();
        model.status = Set(OfferStatus::Pending);
        model.updated_at = Set(Some(Utc::now().into()));
        self.offer_repo.update(model).await
    }

    /// Delete one's own draft.
    pub async fn delete(&self, offer_id: &str, owner_id: &str) -> AppResult<()> {
        let offer = self.authorize_owner(offer_id, owner_id).await?;

        if offer.status != OfferStatus::Draft {
            return Err(AppError::BadRequest(
                "Only drafts can be deleted".to_string(),
            ));
        }

        self.offer_repo.delete(offer_id).await
    }

    /// Get an offer with its gallery.
    pub async fn get_detail(&self, offer_id: &str) -> AppResult<OfferDetail> {
        let offer = self.offer_repo.get_by_id(offer_id).await?;
        let images = self.image_repo.find_by_offer(offer_id).await?;
        Ok(OfferDetail { offer, images })
    }

    /// Search published offers.
    pub async fn search(
        &self,
        filter: &OfferSearchFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<offer::Model>> {
        self.offer_repo.search(filter, limit, offset).await
    }

    /// Get one's own offers.
    pub async fn get_mine(&self, owner_id: &str) -> AppResult<Vec<offer::Model>> {
        self.offer_repo.find_by_owner(owner_id).await
    }

    /// Attach an image URL record to one's own offer.
    pub async fn add_image(
        &self,
        offer_id: &str,
        owner_id: &str,
        url: String,
    ) -> AppResult<offer_image::Model> {
        self.authorize_owner(offer_id, owner_id).await?;

        let existing = self.image_repo.find_by_offer(offer_id).await?;
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let position = existing.len() as i32;

        let model = offer_image::ActiveModel {
            id: Set(self.id_gen.generate()),
            offer_id: Set(offer_id.to_string()),
            url: Set(url),
            position: Set(position),
            created_at: Set(Utc::now().into()),
        };
        self.image_repo.create(model).await
    }

    /// Reorder the gallery of one's own offer.
    ///
    /// `image_ids` must name exactly the offer's current images; positions
    /// are rewritten to match the given order.
    pub async fn reorder_images(
        &self,
        offer_id: &str,
        owner_id: &str,
        image_ids: &[String],
    ) -> AppResult<Vec<offer_image::Model>> {
        self.authorize_owner(offer_id, owner_id).await?;

        let existing = self.image_repo.find_by_offer(offer_id).await?;
        if existing.len() != image_ids.len()
            || !existing.iter().all(|i| image_ids.contains(&i.id))
        {
            return Err(AppError::BadRequest(
                "Image list does not match the offer's gallery".to_string(),
            ));
        }

        let mut reordered = Vec::with_capacity(existing.len());
        for (position, image_id) in (0i32..).zip(image_ids.iter()) {
            // The membership check above guarantees the lookup succeeds.
            if let Some(image) = existing.iter().find(|i| &i.id == image_id) {
                let mut model: offer_image::ActiveModel = image.clone().into();
                model.position = Set(position);
                reordered.push(self.image_repo.update(model).await?);
            }
        }
        Ok(reordered)
    }

    /// Remove an image record from one's own offer.
    pub async fn remove_image(
        &self,
        offer_id: &str,
        owner_id: &str,
        image_id: &str,
    ) -> AppResult<()> {
        self.authorize_owner(offer_id, owner_id).await?;

        let image = self
            .image_repo
            .find_by_id(image_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Image {image_id}")))?;
        if image.offer_id != offer_id {
            return Err(AppError::BadRequest(
                "Image does not belong to this offer".to_string(),
            ));
        }

        self.image_repo.delete(image_id).await
    }

    /// Load an offer and check ownership.
    async fn authorize_owner(&self, offer_id: &str, owner_id: &str) -> AppResult<offer::Model> {
        let offer = self.offer_repo.get_by_id(offer_id).await?;
        if offer.owner_id != owner_id {
            return Err(AppError::Forbidden(
                "Only the offer's owner can modify it".to_string(),
            ));
        }
        Ok(offer)
    }
}
