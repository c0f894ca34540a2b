// src/data/stock_list.rs
// Local KRX master list. The brokerage API has no ticker search, so the
// dashboard searches this list first and only then asks upstream for data.

use crate::types::{ListedStock, MarketCapTier};

const MAX_SEARCH_RESULTS: usize = 20;

pub static STOCK_LIST: &[ListedStock] = &[
    // Semiconductors
    ListedStock { code: "005930", name: "삼성전자", sector: "반도체", tier: MarketCapTier::Large },
    ListedStock { code: "000660", name: "SK하이닉스", sector: "반도체", tier: MarketCapTier::Large },
    ListedStock { code: "042700", name: "한미반도체", sector: "반도체", tier: MarketCapTier::Mid },
    ListedStock { code: "403870", name: "HPSP", sector: "반도체", tier: MarketCapTier::Mid },
    ListedStock { code: "036930", name: "주성엔지니어링", sector: "반도체", tier: MarketCapTier::Mid },
    ListedStock { code: "460860", name: "피엠티", sector: "반도체", tier: MarketCapTier::Mid },
    // Autos
    ListedStock { code: "005380", name: "현대차", sector: "자동차", tier: MarketCapTier::Large },
    ListedStock { code: "000270", name: "기아", sector: "자동차", tier: MarketCapTier::Large },
    ListedStock { code: "012330", name: "현대모비스", sector: "자동차부품", tier: MarketCapTier::Large },
    ListedStock { code: "018880", name: "한온시스템", sector: "자동차부품", tier: MarketCapTier::Mid },
    // IT / platforms
    ListedStock { code: "035420", name: "NAVER", sector: "IT서비스", tier: MarketCapTier::Large },
    ListedStock { code: "035720", name: "카카오", sector: "IT서비스", tier: MarketCapTier::Large },
    ListedStock { code: "263750", name: "펄어비스", sector: "게임", tier: MarketCapTier::Mid },
    ListedStock { code: "251270", name: "넷마블", sector: "게임", tier: MarketCapTier::Mid },
    ListedStock { code: "259960", name: "크래프톤", sector: "게임", tier: MarketCapTier::Large },
    ListedStock { code: "041510", name: "SM", sector: "엔터", tier: MarketCapTier::Mid },
    ListedStock { code: "352820", name: "하이브", sector: "엔터", tier: MarketCapTier::Mid },
    ListedStock { code: "122870", name: "YG PLUS", sector: "엔터", tier: MarketCapTier::Mid },
    // Financials
    ListedStock { code: "055550", name: "신한지주", sector: "금융", tier: MarketCapTier::Large },
    ListedStock { code: "105560", name: "KB금융", sector: "금융", tier: MarketCapTier::Large },
    ListedStock { code: "086790", name: "하나금융지주", sector: "금융", tier: MarketCapTier::Large },
    ListedStock { code: "316140", name: "우리금융지주", sector: "금융", tier: MarketCapTier::Large },
    ListedStock { code: "138930", name: "BNK금융지주", sector: "금융", tier: MarketCapTier::Mid },
    // Bio / pharma
    ListedStock { code: "207940", name: "삼성바이오로직스", sector: "바이오", tier: MarketCapTier::Large },
    ListedStock { code: "068270", name: "셀트리온", sector: "바이오", tier: MarketCapTier::Large },
    ListedStock { code: "326030", name: "SK바이오팜", sector: "바이오", tier: MarketCapTier::Mid },
    ListedStock { code: "145020", name: "휴젤", sector: "바이오", tier: MarketCapTier::Mid },
    ListedStock { code: "196170", name: "알테오젠", sector: "바이오", tier: MarketCapTier::Mid },
    ListedStock { code: "006280", name: "녹십자", sector: "제약", tier: MarketCapTier::Mid },
    // Energy / chemicals
    ListedStock { code: "096770", name: "SK이노베이션", sector: "에너지", tier: MarketCapTier::Large },
    ListedStock { code: "051910", name: "LG화학", sector: "화학", tier: MarketCapTier::Large },
    ListedStock { code: "006400", name: "삼성SDI", sector: "2차전지", tier: MarketCapTier::Large },
    ListedStock { code: "373220", name: "LG에너지솔루션", sector: "2차전지", tier: MarketCapTier::Large },
    ListedStock { code: "247540", name: "에코프로비엠", sector: "2차전지", tier: MarketCapTier::Mid },
    ListedStock { code: "086520", name: "에코프로", sector: "2차전지", tier: MarketCapTier::Mid },
    ListedStock { code: "003670", name: "포스코퓨처엠", sector: "2차전지", tier: MarketCapTier::Mid },
    // Steel / materials
    ListedStock { code: "005490", name: "POSCO홀딩스", sector: "철강", tier: MarketCapTier::Large },
    ListedStock { code: "010130", name: "고려아연", sector: "비철금속", tier: MarketCapTier::Large },
    // Shipbuilding / construction
    ListedStock { code: "009540", name: "한국조선해양", sector: "조선", tier: MarketCapTier::Large },
    ListedStock { code: "329180", name: "HD현대중공업", sector: "조선", tier: MarketCapTier::Large },
    ListedStock { code: "042660", name: "한화오션", sector: "조선", tier: MarketCapTier::Large },
    ListedStock { code: "000720", name: "현대건설", sector: "건설", tier: MarketCapTier::Mid },
    // Telecom
    ListedStock { code: "017670", name: "SK텔레콤", sector: "통신", tier: MarketCapTier::Large },
    ListedStock { code: "030200", name: "KT", sector: "통신", tier: MarketCapTier::Large },
    ListedStock { code: "032640", name: "LG유플러스", sector: "통신", tier: MarketCapTier::Mid },
    // Retail / consumer
    ListedStock { code: "004170", name: "신세계", sector: "유통", tier: MarketCapTier::Mid },
    ListedStock { code: "139480", name: "이마트", sector: "유통", tier: MarketCapTier::Mid },
    ListedStock { code: "069960", name: "현대백화점", sector: "유통", tier: MarketCapTier::Mid },
    ListedStock { code: "097950", name: "CJ제일제당", sector: "식품", tier: MarketCapTier::Mid },
    ListedStock { code: "051600", name: "한전KPS", sector: "전력", tier: MarketCapTier::Mid },
    // Electronics
    ListedStock { code: "066570", name: "LG전자", sector: "전자", tier: MarketCapTier::Large },
    ListedStock { code: "009150", name: "삼성전기", sector: "전자부품", tier: MarketCapTier::Large },
    ListedStock { code: "010950", name: "S-Oil", sector: "정유", tier: MarketCapTier::Mid },
    // Defense / aerospace
    ListedStock { code: "012450", name: "한화에어로스페이스", sector: "방산", tier: MarketCapTier::Large },
    ListedStock { code: "047810", name: "한국항공우주", sector: "방산", tier: MarketCapTier::Large },
    ListedStock { code: "000880", name: "한화", sector: "방산", tier: MarketCapTier::Mid },
    ListedStock { code: "272210", name: "한화시스템", sector: "방산", tier: MarketCapTier::Mid },
    // Holdings / other large caps
    ListedStock { code: "034730", name: "SK", sector: "지주", tier: MarketCapTier::Large },
    ListedStock { code: "003550", name: "LG", sector: "지주", tier: MarketCapTier::Large },
    ListedStock { code: "028260", name: "삼성물산", sector: "지주", tier: MarketCapTier::Large },
    ListedStock { code: "018260", name: "삼성에스디에스", sector: "IT서비스", tier: MarketCapTier::Large },
    ListedStock { code: "030000", name: "제일기획", sector: "광고", tier: MarketCapTier::Mid },
    // AI / robotics
    ListedStock { code: "443060", name: "레인보우로보틱스", sector: "로봇", tier: MarketCapTier::Mid },
    ListedStock { code: "454910", name: "두산로보틱스", sector: "로봇", tier: MarketCapTier::Mid },
];

/// Substring search over name, code and sector. An empty query returns
/// the head of the list so the dashboard has something to show.
pub fn search_stocks(query: &str) -> Vec<&'static ListedStock> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return STOCK_LIST.iter().take(MAX_SEARCH_RESULTS).collect();
    }

    STOCK_LIST
        .iter()
        .filter(|s| {
            s.name.to_lowercase().contains(&q) || s.code.contains(&q) || s.sector.to_lowercase().contains(&q)
        })
        .take(MAX_SEARCH_RESULTS)
        .collect()
}

/// Exact code lookup.
pub fn find_by_code(code: &str) -> Option<&'static ListedStock> {
    STOCK_LIST.iter().find(|s| s.code == code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_by_name_fragment() {
        let results = search_stocks("삼성");
        assert!(!results.is_empty());
        assert!(results.iter().all(|s| s.name.contains("삼성")));
    }

    #[test]
    fn test_search_by_code_and_sector() {
        let by_code = search_stocks("005930");
        assert_eq!(by_code.len(), 1);
        assert_eq!(by_code[0].name, "삼성전자");

        let by_sector = search_stocks("금융");
        assert!(by_sector.len() >= 5);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        assert_eq!(search_stocks("naver").len(), search_stocks("NAVER").len());
    }

    #[test]
    fn test_empty_query_returns_capped_head() {
        let results = search_stocks("   ");
        assert_eq!(results.len(), MAX_SEARCH_RESULTS);
    }

    #[test]
    fn test_find_by_code() {
        assert!(find_by_code("000660").is_some());
        assert!(find_by_code("999999").is_none());
    }
}
