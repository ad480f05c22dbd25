//! # Concurrency Flows
//!
//! Racing signers against the repository's conditional slot update. The
//! service holds no cross-request locks, so these races are decided
//! entirely by the store.

#[cfg(test)]
mod tests {
    use crate::support::{init_tracing, Platform, SigningUser};
    use chrono::{Duration, Utc};
    use deal_protocol::{
        CreateDealRequest, DealError, DealProtocolApi, DealStatus, SignDealRequest,
    };
    use shared_types::{PropertyId, PropertyStatus, UserId};
    use std::sync::Arc;

    const PROPERTY: &str = "prop-200";

    fn create_request(owner: &UserId, renter: &UserId) -> CreateDealRequest {
        let now = Utc::now();
        CreateDealRequest {
            property_id: PropertyId::from(PROPERTY),
            owner_id: owner.clone(),
            renter_id: Some(renter.clone()),
            start_date: now,
            end_date: now + Duration::days(365),
            monthly_rent: 1500,
            security_deposit: 3000,
            terms: "12 month lease".into(),
            signature: None,
        }
    }

    fn sign_request(deal: &deal_protocol::Deal, signature: String) -> SignDealRequest {
        SignDealRequest {
            deal_id: Some(deal.id.clone()),
            property_id: deal.property_id.clone(),
            owner_id: deal.owner_id.clone(),
            renter_id: deal.renter_id.clone().unwrap(),
            signature,
            create_on_sign: false,
            terms: None,
            start_date: None,
            end_date: None,
            monthly_rent: None,
            security_deposit: None,
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_both_parties_signing_concurrently_completes_the_deal() {
        init_tracing();
        let platform = Platform::new();
        let owner = SigningUser::register(&platform, "owner-200").await;
        let renter = SigningUser::register(&platform, "renter-200").await;
        platform.seed_property(PROPERTY, &owner.id);

        let deal = platform
            .protocol
            .create_deal(&owner.id, create_request(&owner.id, &renter.id))
            .await
            .unwrap();

        let owner_req = sign_request(&deal, owner.sign(&deal));
        let renter_req = sign_request(&deal, renter.sign(&deal));
        let owner_id = owner.id.clone();
        let renter_id = renter.id.clone();
        let p1 = Arc::clone(&platform.protocol);
        let p2 = Arc::clone(&platform.protocol);

        let (owner_res, renter_res) = tokio::join!(
            tokio::spawn(async move { p1.sign_deal(&owner_id, owner_req).await }),
            tokio::spawn(async move { p2.sign_deal(&renter_id, renter_req).await }),
        );

        // Different slots never conflict; both signings land.
        owner_res.unwrap().unwrap();
        renter_res.unwrap().unwrap();

        let final_deal = platform.protocol.get_deal(&owner.id, &deal.id).await.unwrap();
        assert_eq!(final_deal.status, DealStatus::Completed);
        assert_eq!(
            platform.property_status(PROPERTY).await,
            PropertyStatus::Rented
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_same_slot_race_applies_exactly_one_signature() {
        init_tracing();
        let platform = Platform::new();
        let owner = SigningUser::register(&platform, "owner-201").await;
        let renter = SigningUser::register(&platform, "renter-201").await;
        platform.seed_property(PROPERTY, &owner.id);

        let deal = platform
            .protocol
            .create_deal(&owner.id, create_request(&owner.id, &renter.id))
            .await
            .unwrap();

        let first_req = sign_request(&deal, owner.sign(&deal));
        let second_req = sign_request(&deal, owner.sign(&deal));
        let id_a = owner.id.clone();
        let id_b = owner.id.clone();
        let p1 = Arc::clone(&platform.protocol);
        let p2 = Arc::clone(&platform.protocol);

        let (a, b) = tokio::join!(
            tokio::spawn(async move { p1.sign_deal(&id_a, first_req).await }),
            tokio::spawn(async move { p2.sign_deal(&id_b, second_req).await }),
        );
        let results = [a.unwrap(), b.unwrap()];

        let ok_count = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(ok_count, 1, "exactly one signing must win the slot");
        // The loser either lost the conditional update or re-read the deal
        // after the winner's slot was recorded.
        let loser = results.iter().find(|r| r.is_err()).unwrap();
        assert!(matches!(
            loser,
            Err(DealError::Conflict(_)) | Err(DealError::AlreadySigned)
        ));

        let stored = platform.protocol.get_deal(&owner.id, &deal.id).await.unwrap();
        assert!(stored.signatures.owner.is_signed());
        assert!(!stored.signatures.renter.is_signed());
        assert_eq!(stored.status, DealStatus::Pending);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrent_creation_yields_a_single_active_deal() {
        init_tracing();
        let platform = Platform::new();
        let owner = SigningUser::register(&platform, "owner-202").await;
        let renter = SigningUser::register(&platform, "renter-202").await;
        platform.seed_property(PROPERTY, &owner.id);

        let req_a = create_request(&owner.id, &renter.id);
        let req_b = create_request(&owner.id, &renter.id);
        let id_a = owner.id.clone();
        let id_b = renter.id.clone();
        let p1 = Arc::clone(&platform.protocol);
        let p2 = Arc::clone(&platform.protocol);

        let (a, b) = tokio::join!(
            tokio::spawn(async move { p1.create_deal(&id_a, req_a).await }),
            tokio::spawn(async move { p2.create_deal(&id_b, req_b).await }),
        );
        let deal_a = a.unwrap().unwrap();
        let deal_b = b.unwrap().unwrap();

        // The loser of the insert race is handed the winner's deal.
        assert_eq!(deal_a.id, deal_b.id);
        assert_eq!(
            platform.protocol.deals_for_user(&owner.id).await.unwrap().len(),
            1
        );
    }
}
