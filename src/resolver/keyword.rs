use async_trait::async_trait;
use log::debug;

use super::{ Resolver, ResolverKind };

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Tracks,
    Booking,
    Pricing,
    Requirements,
    Leaderboard,
    Safety,
    Streaming,
    Contact,
    Gratitude,
    Greeting,
    Fallback,
}

struct TopicRule {
    topic: Topic,
    triggers: &'static [&'static str],
}

// Checked top to bottom; the first rule with a matching trigger wins.
const RULES: &[TopicRule] = &[
    TopicRule { topic: Topic::Tracks, triggers: &["трасс", "track"] },
    TopicRule { topic: Topic::Booking, triggers: &["запис", "бронир", "время"] },
    TopicRule { topic: Topic::Pricing, triggers: &["цен", "стоимост", "сколько"] },
    TopicRule { topic: Topic::Requirements, triggers: &["требован", "нужно", "права"] },
    TopicRule { topic: Topic::Leaderboard, triggers: &["рейтинг", "лидер", "чемпион"] },
    TopicRule { topic: Topic::Safety, triggers: &["безопасност", "страховк"] },
    TopicRule { topic: Topic::Streaming, triggers: &["трансляц", "онлайн", "смотреть"] },
    TopicRule { topic: Topic::Contact, triggers: &["контакт", "телефон", "адрес"] },
    TopicRule { topic: Topic::Gratitude, triggers: &["спасибо", "благодар"] },
    TopicRule { topic: Topic::Greeting, triggers: &["привет", "здравств"] },
];

impl Topic {
    pub fn reply(self) -> &'static str {
        match self {
            Topic::Tracks =>
                "У нас есть три премиальных трассы: Art-Americo-2019 (4.2 км, эксперт), Off-Race (3.8 км, продвинутый) и GMX-1 (5.1 км, профессионал). Каждая трасса имеет уникальные характеристики и вызовы!",
            Topic::Booking =>
                "Для записи выберите трассу в разделе \"Трассы\", затем перейдите в \"Бронирование\", укажите дату и доступное время. Мы работаем с 9:00 до 21:00 ежедневно.",
            Topic::Pricing =>
                "Стоимость зависит от выбранной трассы и времени:\n• Art-Americo-2019: от 5000₽/час\n• Off-Race: от 4000₽/час\n• GMX-1: от 6000₽/час\nДоступны пакетные предложения и абонементы со скидками до 30%!",
            Topic::Requirements =>
                "Для участия необходимо: водительские права категории B, возраст от 18 лет, медицинская справка (предоставим на месте). Все защитное снаряжение включено в стоимость.",
            Topic::Leaderboard =>
                "Рейтинг обновляется в реальном времени! Лидирует Александр Петров с 2847 очками. Участвуйте в гонках, улучшайте время круга и поднимайтесь в топ!",
            Topic::Safety =>
                "Ваша безопасность — наш приоритет! Мы предоставляем полный комплект защитного снаряжения, профессиональные инструкторы всегда на трассе, а все участники застрахованы.",
            Topic::Streaming =>
                "Все крупные соревнования транслируются онлайн! Включите трансляцию на главной странице или подпишитесь на уведомления о предстоящих событиях.",
            Topic::Contact =>
                "Свяжитесь с нами:\n📞 +7 (495) 123-45-67 (Пн-Вс 9:00-21:00)\n📧 info@racetrack.pro\n📍 Москва, Гоночная ул. 1, Автодром «Профи»",
            Topic::Gratitude =>
                "Всегда рад помочь! Если возникнут ещё вопросы — обращайтесь. Удачных гонок! 🏁",
            Topic::Greeting =>
                "Привет! Рад видеть вас в RaceTrack Pro. Готов ответить на любые вопросы о трассах, бронировании или соревнованиях!",
            Topic::Fallback =>
                "Спасибо за вопрос! Я могу помочь с информацией о трассах, бронированием, ценами, требованиями для участия и многим другим. Задайте конкретный вопрос, и я с радостью отвечу!",
        }
    }
}

/// Lowercases `text` and returns the first topic whose trigger occurs in it.
pub fn classify(text: &str) -> Topic {
    let lower = text.to_lowercase();
    RULES.iter()
        .find(|rule| rule.triggers.iter().any(|trigger| lower.contains(trigger)))
        .map(|rule| rule.topic)
        .unwrap_or(Topic::Fallback)
}

pub fn reply_for(text: &str) -> &'static str {
    classify(text).reply()
}

/// Offline resolver answering from a fixed keyword table.
#[derive(Debug, Default, Clone)]
pub struct KeywordResolver;

impl KeywordResolver {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Resolver for KeywordResolver {
    async fn resolve(&self, text: &str) -> String {
        let topic = classify(text);
        debug!("Keyword resolver matched topic {:?}", topic);
        topic.reply().to_string()
    }

    fn kind(&self) -> ResolverKind {
        ResolverKind::Keyword
    }
}
