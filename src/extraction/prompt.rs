//! Natural-language instructions sent with each roster PDF.

use crate::catalog::{district_names, BUSINESS_CATEGORIES};
use crate::models::DocumentCategory;

/// Builds the extraction instruction for a roster of the given category.
pub fn extraction_prompt(category: DocumentCategory) -> String {
    let categories = BUSINESS_CATEGORIES
        .iter()
        .map(|(label, code)| format!("- {label}: {code}"))
        .collect::<Vec<_>>()
        .join("\n");
    let districts = district_names().join("、");
    let is_large = category.is_large_retailer();
    let certificate = category.certificate_type();

    format!(
        r#"The attached PDF is a roster of shops in 中央区 (Chuo City, Tokyo) that accept shopping certificates.
Extract every shop and return a JSON array where each element has exactly this structure:

{{
  "name": "店舗名",
  "address": "住所（「中央区」より後の部分のみ）",
  "phoneNumber": "03-1234-5678 or null",
  "businessCategory": "業種カテゴリ",
  "businessCategoryCode": 1,
  "district": "地区名",
  "isLargeRetailer": {is_large},
  "specialMarket": "築地魚河岸 などの特別市場名 or null",
  "certificateType": "{certificate}"
}}

Business category codes:
{categories}

Districts of 中央区: {districts}

Rules:
1. Extract only actual shops; skip headers, page numbers and category titles.
2. For the address keep only the part after "中央区".
3. Derive the district from the address when possible.
4. Format phone numbers like "03-1234-5678"; use null when absent.
5. If a special market such as "築地魚河岸" is mentioned for a shop, set specialMarket.
6. Return only the JSON array, with no explanation and no Markdown."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_mentions_category_specifics() {
        let small = extraction_prompt(DocumentCategory::SmallMedium);
        assert!(small.contains("\"isLargeRetailer\": false"));
        assert!(small.contains("中小小売店(全券種)"));

        let large = extraction_prompt(DocumentCategory::Large);
        assert!(large.contains("\"isLargeRetailer\": true"));
        assert!(large.contains("大規模小売店(青色券)"));
    }

    #[test]
    fn test_prompt_lists_reference_data() {
        let prompt = extraction_prompt(DocumentCategory::SmallMedium);
        assert!(prompt.contains("- 飲食料品小売業: 3"));
        assert!(prompt.contains("- 大規模小売店: 10"));
        assert!(prompt.contains("月島"));
        assert!(prompt.contains("東銀座"));
    }
}
