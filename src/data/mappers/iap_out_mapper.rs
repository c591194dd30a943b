//! Billing-service shapes to domain entities.

use crate::{
    data::models::billing_client::{
        billing_result_model::{response_code, BillingResultModel},
        product_details_model::{ProductDetailsModel, ProductTypeModel},
        purchase_model::{PurchaseModel, PurchaseStateModel},
    },
    domain::entities::{
        iap_product::IapProductType,
        iap_product_details::{IapOffer, IapProductDetails},
        iap_purchase::{IapPurchase, IapPurchaseState, IapPurchasedProduct},
    },
    errors::IapError,
};

pub(crate) fn billing_result_to_result(
    billing_result: &BillingResultModel,
) -> Result<(), IapError> {
    if billing_result.is_success() {
        Ok(())
    } else {
        Err(error_from_response_code(
            billing_result.response_code,
            &billing_result.debug_message,
        ))
    }
}

/// Maps a non-OK response code to its error variant. Unrecognized codes, and
/// `OK` itself, become `Unknown`.
pub(crate) fn error_from_response_code(code: i32, debug_message: &str) -> IapError {
    let m = debug_message.to_string();
    match code {
        response_code::USER_CANCELED => IapError::UserCancelled(m),
        response_code::ITEM_ALREADY_OWNED => IapError::ItemAlreadyOwned(m),
        response_code::DEVELOPER_ERROR => IapError::DeveloperError(m),
        response_code::SERVICE_DISCONNECTED => IapError::ServiceDisconnected(m),
        response_code::BILLING_UNAVAILABLE => IapError::BillingUnavailable(m),
        response_code::ITEM_UNAVAILABLE => IapError::ItemUnavailable(m),
        response_code::FEATURE_NOT_SUPPORTED => IapError::FeatureNotSupported(m),
        response_code::SERVICE_TIMEOUT => IapError::ServiceTimeout(m),
        response_code::SERVICE_UNAVAILABLE => IapError::ServiceUnavailable(m),
        response_code::ITEM_NOT_OWNED => IapError::ItemNotOwned(m),
        _ => IapError::Unknown(m),
    }
}

impl From<ProductTypeModel> for IapProductType {
    fn from(m: ProductTypeModel) -> Self {
        match m {
            ProductTypeModel::Subs => IapProductType::Subscription,
            ProductTypeModel::InApp => IapProductType::OneTime,
        }
    }
}

impl From<PurchaseStateModel> for IapPurchaseState {
    fn from(m: PurchaseStateModel) -> Self {
        match m {
            PurchaseStateModel::UnspecifiedState => IapPurchaseState::Unspecified,
            PurchaseStateModel::Purchased => IapPurchaseState::Purchased,
            PurchaseStateModel::Pending => IapPurchaseState::Pending,
        }
    }
}

impl IapProductDetails {
    pub(crate) fn from_model(m: ProductDetailsModel) -> Self {
        let offers: Vec<IapOffer> = match (
            m.one_time_purchase_offer_details,
            m.subscription_offer_details,
        ) {
            (Some(one_time), _) => vec![IapOffer {
                offer_token: None,
                base_plan_id: None,
                offer_id: None,
                price_micros: one_time.price_amount_micros,
                formatted_price: one_time.formatted_price,
                currency: one_time.price_currency_code,
            }],
            (None, Some(subscription_offers)) => subscription_offers
                .into_iter()
                .map(|o| {
                    // First phase is what the user is charged when the flow
                    // completes (possibly a trial or intro price).
                    let first_phase = o.pricing_phases.pricing_phase_list.into_iter().next();
                    IapOffer {
                        offer_token: Some(o.offer_token),
                        base_plan_id: Some(o.base_plan_id),
                        offer_id: o.offer_id,
                        price_micros: first_phase.as_ref().map_or(0, |p| p.price_amount_micros),
                        formatted_price: first_phase
                            .as_ref()
                            .map(|p| p.formatted_price.clone())
                            .unwrap_or_default(),
                        currency: first_phase
                            .map(|p| p.price_currency_code)
                            .unwrap_or_default(),
                    }
                })
                .collect(),
            (None, None) => Vec::new(),
        };
        let first_offer = offers.first();
        IapProductDetails {
            product_id: m.product_id,
            product_type: m.product_type.into(),
            localized_title: m.name,
            localized_description: m.description,
            price_micros: first_offer.map_or(0, |o| o.price_micros),
            formatted_price: first_offer
                .map(|o| o.formatted_price.clone())
                .unwrap_or_default(),
            currency: first_offer.map(|o| o.currency.clone()).unwrap_or_default(),
            offers,
        }
    }
}

impl IapPurchase {
    /// `details` must hold the resolved details of every id in
    /// `m.products`, in the same order.
    pub(crate) fn from_model(m: PurchaseModel, details: Vec<IapProductDetails>) -> Self {
        IapPurchase {
            order_id: m.order_id,
            products: details.into_iter().map(IapPurchasedProduct::from).collect(),
            is_acknowledged: m.is_acknowledged,
            is_auto_renewing: m.is_auto_renewing,
            state: m.purchase_state.into(),
            purchase_time: m.purchase_time,
            quantity: m.quantity.unwrap_or(1),
            purchase_token: m.purchase_token,
            signature: m.signature,
        }
    }
}

impl From<IapProductDetails> for IapPurchasedProduct {
    fn from(d: IapProductDetails) -> Self {
        IapPurchasedProduct {
            product_id: d.product_id,
            product_type: d.product_type,
            localized_title: d.localized_title,
            localized_description: d.localized_description,
            price_micros: d.price_micros,
            currency: d.currency,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::data::models::billing_client::product_details_model::{
        OneTimePurchaseOfferDetailsModel, PricingPhaseModel, PricingPhasesModel,
        SubscriptionOfferDetailsModel,
    };

    #[test]
    fn every_known_response_code_maps_to_its_own_variant() {
        let cases: Vec<(i32, fn(String) -> IapError)> = vec![
            (response_code::USER_CANCELED, IapError::UserCancelled),
            (response_code::ITEM_ALREADY_OWNED, IapError::ItemAlreadyOwned),
            (response_code::DEVELOPER_ERROR, IapError::DeveloperError),
            (response_code::SERVICE_DISCONNECTED, IapError::ServiceDisconnected),
            (response_code::BILLING_UNAVAILABLE, IapError::BillingUnavailable),
            (response_code::ITEM_UNAVAILABLE, IapError::ItemUnavailable),
            (response_code::FEATURE_NOT_SUPPORTED, IapError::FeatureNotSupported),
            (response_code::SERVICE_TIMEOUT, IapError::ServiceTimeout),
            (response_code::SERVICE_UNAVAILABLE, IapError::ServiceUnavailable),
            (response_code::ITEM_NOT_OWNED, IapError::ItemNotOwned),
        ];
        let mut seen = Vec::new();
        for (code, variant) in cases {
            let mapped = error_from_response_code(code, "debug message");
            assert_eq!(mapped, variant("debug message".to_string()));
            assert!(!seen.contains(&mapped), "{code} collides with another code");
            seen.push(mapped);
        }
    }

    #[test]
    fn unrecognized_codes_map_to_unknown() {
        for code in [response_code::ERROR, response_code::NETWORK_ERROR, 42, -99] {
            assert_eq!(
                error_from_response_code(code, "x"),
                IapError::Unknown("x".to_string())
            );
        }
    }

    #[test]
    fn ok_billing_result_is_not_an_error() {
        assert_eq!(billing_result_to_result(&BillingResultModel::ok()), Ok(()));
        assert_eq!(
            billing_result_to_result(&BillingResultModel::new(
                response_code::SERVICE_TIMEOUT,
                "slow"
            )),
            Err(IapError::ServiceTimeout("slow".to_string()))
        );
    }

    #[test]
    fn subscription_details_take_price_from_first_offer() {
        let phase = |micros: i64, formatted: &str| PricingPhaseModel {
            formatted_price: formatted.to_string(),
            price_amount_micros: micros,
            price_currency_code: "USD".to_string(),
            billing_period: "P1M".to_string(),
        };
        let m = ProductDetailsModel {
            product_id: "premium".to_string(),
            product_type: ProductTypeModel::Subs,
            title: "Premium (Store)".to_string(),
            name: "Premium".to_string(),
            description: "best plan ever".to_string(),
            one_time_purchase_offer_details: None,
            subscription_offer_details: Some(vec![
                SubscriptionOfferDetailsModel {
                    base_plan_id: "monthly".to_string(),
                    offer_id: None,
                    offer_token: "token-monthly".to_string(),
                    pricing_phases: PricingPhasesModel {
                        pricing_phase_list: vec![phase(45_000_000, "$45.00")],
                    },
                },
                SubscriptionOfferDetailsModel {
                    base_plan_id: "yearly".to_string(),
                    offer_id: Some("intro".to_string()),
                    offer_token: "token-yearly".to_string(),
                    pricing_phases: PricingPhasesModel {
                        pricing_phase_list: vec![],
                    },
                },
            ]),
        };

        let d = IapProductDetails::from_model(m);

        assert_eq!(d.product_type, IapProductType::Subscription);
        assert_eq!(d.localized_title, "Premium");
        assert_eq!(d.price_micros, 45_000_000);
        assert_eq!(d.formatted_price, "$45.00");
        assert_eq!(d.currency, "USD");
        assert_eq!(d.offers.len(), 2);
        assert_eq!(d.offers[0].offer_token.as_deref(), Some("token-monthly"));
        assert_eq!(d.offers[1].price_micros, 0);
    }

    #[test]
    fn one_time_details_have_a_single_tokenless_offer() {
        let m = ProductDetailsModel {
            product_id: "credits".to_string(),
            product_type: ProductTypeModel::InApp,
            title: "Credits (Store)".to_string(),
            name: "Credits".to_string(),
            description: "".to_string(),
            one_time_purchase_offer_details: Some(OneTimePurchaseOfferDetailsModel {
                formatted_price: "AED 3.67".to_string(),
                price_amount_micros: 3_670_000,
                price_currency_code: "AED".to_string(),
            }),
            subscription_offer_details: None,
        };

        let d = IapProductDetails::from_model(m);

        assert_eq!(d.product_type, IapProductType::OneTime);
        assert_eq!(d.currency, "AED");
        assert_eq!(d.offers.len(), 1);
        assert_eq!(d.offers[0].offer_token, None);
    }

    #[test]
    fn purchase_defaults_quantity_and_maps_state() {
        let m = PurchaseModel {
            order_id: Some("GPA.1".to_string()),
            products: vec!["credits".to_string()],
            purchase_state: PurchaseStateModel::Pending,
            purchase_time: Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
            purchase_token: "token".to_string(),
            signature: "sig".to_string(),
            is_acknowledged: false,
            is_auto_renewing: false,
            quantity: None,
        };
        let details = IapProductDetails {
            product_id: "credits".to_string(),
            product_type: IapProductType::OneTime,
            localized_title: "Credits".to_string(),
            localized_description: String::new(),
            price_micros: 1_000_000,
            formatted_price: "$1.00".to_string(),
            currency: "USD".to_string(),
            offers: vec![],
        };

        let p = IapPurchase::from_model(m, vec![details]);

        assert_eq!(p.state, IapPurchaseState::Pending);
        assert_eq!(p.quantity, 1);
        assert!(p.contains_product("credits"));
        assert_eq!(p.products[0].price_micros, 1_000_000);
    }
}
