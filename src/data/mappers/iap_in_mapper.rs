//! Domain entities to billing-service shapes.

use crate::{
    data::models::billing_client::{
        billing_flow_params_model::{BillingFlowParamsModel, ProductDetailsParamsModel},
        product_details_model::ProductTypeModel,
    },
    domain::entities::{iap_product::IapProductType, iap_product_details::IapProductDetails},
    errors::IapError,
};

impl From<IapProductType> for ProductTypeModel {
    fn from(t: IapProductType) -> Self {
        match t {
            IapProductType::Subscription => ProductTypeModel::Subs,
            IapProductType::OneTime => ProductTypeModel::InApp,
        }
    }
}

impl BillingFlowParamsModel {
    /// Builds flow parameters for the product's first offer.
    pub(crate) fn from_product_details(details: &IapProductDetails) -> Result<Self, IapError> {
        let offer_token = match details.product_type {
            IapProductType::Subscription => Some(
                details
                    .offers
                    .iter()
                    .find_map(|o| o.offer_token.clone())
                    .ok_or_else(|| {
                        IapError::DeveloperError(format!(
                            "subscription {} has no purchasable offer",
                            details.product_id
                        ))
                    })?,
            ),
            IapProductType::OneTime => None,
        };
        Ok(BillingFlowParamsModel {
            product_details_params_list: vec![ProductDetailsParamsModel {
                product_id: details.product_id.clone(),
                product_type: details.product_type.into(),
                offer_token,
            }],
        })
    }
}
