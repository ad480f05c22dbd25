//! # Integration Test Flows
//!
//! End-to-end flows across key-registry, deal-crypto, and deal-protocol:
//! key registration, deal creation, two-party signing, and the availability
//! projection onto the property catalog.

#[cfg(test)]
mod tests {
    use crate::support::{init_tracing, Platform, SigningUser};
    use chrono::{Duration, Utc};
    use deal_protocol::{
        CreateDealRequest, DealError, DealEvent, DealProtocolApi, DealStatus, DealStatusQuery,
        DealStatusView, DealTemplate, PaymentRequest, PaymentStatus, ReviewRequest,
        SignDealRequest,
    };
    use shared_types::{PropertyId, PropertyStatus, UserId};

    const PROPERTY: &str = "prop-100";

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
            terms: "12 month lease, no subletting".into(),
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

    // =========================================================================
    // FULL LIFECYCLE
    // =========================================================================

    #[tokio::test]
    async fn test_registration_through_deal_completion() {
        init_tracing();
        let platform = Platform::new();
        let owner = SigningUser::register(&platform, "owner-100").await;
        let renter = SigningUser::register(&platform, "renter-100").await;
        platform.seed_property(PROPERTY, &owner.id);

        // Before any deal exists the status query serves a template.
        let query = DealStatusQuery {
            property_id: PropertyId::from(PROPERTY),
            owner_id: Some(owner.id.clone()),
            renter_id: Some(renter.id.clone()),
        };
        match platform
            .protocol
            .deal_status(&renter.id, query.clone())
            .await
            .unwrap()
        {
            DealStatusView::Template(template) => {
                assert_eq!(template.terms, DealTemplate::DEFAULT_TERMS);
            }
            DealStatusView::Existing(_) => panic!("no deal should exist yet"),
        }

        let deal = platform
            .protocol
            .create_deal(&owner.id, create_request(&owner.id, &renter.id))
            .await
            .unwrap();
        assert_eq!(deal.status, DealStatus::Pending);
        assert_eq!(
            platform.property_status(PROPERTY).await,
            PropertyStatus::Pending
        );

        platform
            .protocol
            .sign_deal(&owner.id, sign_request(&deal, owner.sign(&deal)))
            .await
            .unwrap();
        let completed = platform
            .protocol
            .sign_deal(&renter.id, sign_request(&deal, renter.sign(&deal)))
            .await
            .unwrap();

        assert_eq!(completed.status, DealStatus::Completed);
        assert!(completed.is_fully_signed());
        assert_eq!(
            platform.property_status(PROPERTY).await,
            PropertyStatus::Rented
        );

        // The status query now serves the persisted deal.
        match platform.protocol.deal_status(&owner.id, query).await.unwrap() {
            DealStatusView::Existing(existing) => assert_eq!(existing.id, deal.id),
            DealStatusView::Template(_) => panic!("deal should be persisted"),
        }

        // Both parties were told about the completion.
        let events = platform.notifier.events();
        for user in [&owner.id, &renter.id] {
            assert!(events.contains(&(
                user.clone(),
                DealEvent::DealCompleted {
                    deal_id: deal.id.clone()
                }
            )));
        }

        // Post-completion: the renter records a payment, both leave reviews.
        let with_payment = platform
            .protocol
            .add_payment(
                &renter.id,
                &deal.id,
                PaymentRequest {
                    amount: 1500,
                    due_date: Utc::now(),
                    payment_method: "bank-transfer".into(),
                    transaction_id: "txn-42".into(),
                },
            )
            .await
            .unwrap();
        assert_eq!(with_payment.payments[0].status, PaymentStatus::Paid);

        for (user, comment) in [(&owner.id, "reliable tenant"), (&renter.id, "great flat")] {
            platform
                .protocol
                .add_review(
                    user,
                    &deal.id,
                    ReviewRequest {
                        rating: 5,
                        comment: comment.into(),
                    },
                )
                .await
                .unwrap();
        }
        let final_deal = platform.protocol.get_deal(&owner.id, &deal.id).await.unwrap();
        assert_eq!(final_deal.reviews.len(), 2);
    }

    #[tokio::test]
    async fn test_renter_creates_and_signs_in_one_call() {
        init_tracing();
        let platform = Platform::new();
        let owner = SigningUser::register(&platform, "owner-101").await;
        let renter = SigningUser::register(&platform, "renter-101").await;
        platform.seed_property(PROPERTY, &owner.id);

        // The renter signs the canonical core of a deal that does not exist
        // yet; the call creates it with their slot already signed.
        let probe = template_deal(&owner.id, &renter.id);
        let request = SignDealRequest {
            deal_id: None,
            property_id: PropertyId::from(PROPERTY),
            owner_id: owner.id.clone(),
            renter_id: renter.id.clone(),
            signature: renter.sign(&probe),
            create_on_sign: true,
            terms: Some("6 month lease".into()),
            start_date: None,
            end_date: None,
            monthly_rent: Some(900),
            security_deposit: Some(900),
        };

        let deal = platform.protocol.sign_deal(&renter.id, request).await.unwrap();
        assert!(deal.signatures.renter.is_signed());
        assert!(!deal.signatures.owner.is_signed());
        assert_eq!(deal.status, DealStatus::Pending);

        // The owner counter-signs the persisted deal to complete it.
        let completed = platform
            .protocol
            .sign_deal(&owner.id, sign_request(&deal, owner.sign(&deal)))
            .await
            .unwrap();
        assert_eq!(completed.status, DealStatus::Completed);
    }

    fn template_deal(owner: &UserId, renter: &UserId) -> deal_protocol::Deal {
        let now = Utc::now();
        deal_protocol::Deal {
            id: shared_types::DealId::generate(),
            property_id: PropertyId::from(PROPERTY),
            owner_id: owner.clone(),
            renter_id: Some(renter.clone()),
            start_date: now,
            end_date: now + Duration::days(180),
            monthly_rent: 900,
            security_deposit: 900,
            terms: "6 month lease".into(),
            status: DealStatus::Pending,
            signatures: deal_protocol::DealSignatures::unsigned(),
            payments: vec![],
            reviews: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    // =========================================================================
    // FAILURE FLOWS
    // =========================================================================

    #[tokio::test]
    async fn test_key_rotation_between_signings_blocks_completion() {
        init_tracing();
        let platform = Platform::new();
        let mut owner = SigningUser::register(&platform, "owner-102").await;
        let renter = SigningUser::register(&platform, "renter-102").await;
        platform.seed_property(PROPERTY, &owner.id);

        let deal = platform
            .protocol
            .create_deal(&owner.id, create_request(&owner.id, &renter.id))
            .await
            .unwrap();
        platform
            .protocol
            .sign_deal(&owner.id, sign_request(&deal, owner.sign(&deal)))
            .await
            .unwrap();

        owner.rotate_key(&platform).await;

        let result = platform
            .protocol
            .sign_deal(&renter.id, sign_request(&deal, renter.sign(&deal)))
            .await;
        assert!(matches!(
            result,
            Err(DealError::StaleCounterpartSignature(_))
        ));

        // The renter slot was not recorded and the deal stays pending.
        let stored = platform.protocol.get_deal(&renter.id, &deal.id).await.unwrap();
        assert!(!stored.signatures.renter.is_signed());
        assert_eq!(stored.status, DealStatus::Pending);
    }

    #[tokio::test]
    async fn test_signing_without_registered_key() {
        init_tracing();
        let platform = Platform::new();
        let owner = SigningUser::register(&platform, "owner-103").await;
        platform.seed_property(PROPERTY, &owner.id);

        let keyless = UserId::from("renter-keyless");
        let mut request = create_request(&owner.id, &keyless);
        request.renter_id = Some(keyless.clone());
        let deal = platform.protocol.create_deal(&owner.id, request).await.unwrap();

        let result = platform
            .protocol
            .sign_deal(&keyless, sign_request(&deal, "c2lnbmF0dXJl".into()))
            .await;
        assert_eq!(result, Err(DealError::PublicKeyNotFound(keyless)));
    }

    #[tokio::test]
    async fn test_rented_property_rejects_new_deals() {
        init_tracing();
        let platform = Platform::new();
        let owner = SigningUser::register(&platform, "owner-104").await;
        let renter = SigningUser::register(&platform, "renter-104").await;
        platform.seed_property(PROPERTY, &owner.id);

        let deal = platform
            .protocol
            .create_deal(&owner.id, create_request(&owner.id, &renter.id))
            .await
            .unwrap();
        platform
            .protocol
            .sign_deal(&owner.id, sign_request(&deal, owner.sign(&deal)))
            .await
            .unwrap();
        platform
            .protocol
            .sign_deal(&renter.id, sign_request(&deal, renter.sign(&deal)))
            .await
            .unwrap();
        assert_eq!(
            platform.property_status(PROPERTY).await,
            PropertyStatus::Rented
        );

        let late_renter = SigningUser::register(&platform, "renter-105").await;
        let result = platform
            .protocol
            .create_deal(&owner.id, create_request(&owner.id, &late_renter.id))
            .await;
        assert!(matches!(
            result,
            Err(DealError::PropertyUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_cancellation_reopens_property_for_new_deals() {
        init_tracing();
        let platform = Platform::new();
        let owner = SigningUser::register(&platform, "owner-106").await;
        let renter = SigningUser::register(&platform, "renter-106").await;
        platform.seed_property(PROPERTY, &owner.id);

        let deal = platform
            .protocol
            .create_deal(&owner.id, create_request(&owner.id, &renter.id))
            .await
            .unwrap();
        platform
            .protocol
            .update_status(&renter.id, &deal.id, DealStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(
            platform.property_status(PROPERTY).await,
            PropertyStatus::Available
        );

        let next_renter = SigningUser::register(&platform, "renter-107").await;
        let next = platform
            .protocol
            .create_deal(&owner.id, create_request(&owner.id, &next_renter.id))
            .await
            .unwrap();
        assert_ne!(next.id, deal.id);
    }
}
